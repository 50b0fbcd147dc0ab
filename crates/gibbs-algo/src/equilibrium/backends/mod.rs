//! Built-in NLP solver backends.
//!
//! Each backend drives the same [`GibbsProblem`](super::nlp::GibbsProblem)
//! callbacks through the [`NlpBackend`] trait.

mod lbfgs;

#[cfg(feature = "solver-ipopt")]
mod ipopt;

pub use lbfgs::{solve_with_start, LbfgsBackend};

#[cfg(feature = "solver-ipopt")]
pub use ipopt::{IpoptBackend, IpoptGibbs};

use tracing::warn;

use super::traits::NlpBackend;
use crate::error::GibbsError;

/// Backends compiled into this build, preferred first.
pub fn available_backends() -> Vec<Box<dyn NlpBackend>> {
    let mut backends: Vec<Box<dyn NlpBackend>> = Vec::new();
    #[cfg(feature = "solver-ipopt")]
    backends.push(Box::new(IpoptBackend));
    backends.push(Box::new(LbfgsBackend));
    backends
}

/// Look up a backend by id.
///
/// `None` picks the first available backend. Asking for `ipopt` in a build
/// without the `solver-ipopt` feature falls back to `lbfgs`.
pub fn select_backend(id: Option<&str>) -> Result<Box<dyn NlpBackend>, GibbsError> {
    let backends = available_backends();
    let Some(id) = id else {
        return backends
            .into_iter()
            .find(|b| b.is_available())
            .ok_or_else(|| GibbsError::NotAvailable("no solver backend".to_string()));
    };

    if let Some(backend) = backends
        .into_iter()
        .find(|b| b.id() == id && b.is_available())
    {
        return Ok(backend);
    }

    match id {
        "ipopt" => {
            warn!("IPOPT backend not compiled in (feature `solver-ipopt`), using lbfgs");
            Ok(Box::new(LbfgsBackend))
        }
        other => Err(GibbsError::NotAvailable(format!(
            "unknown backend '{other}' (expected lbfgs or ipopt)"
        ))),
    }
}
