pub mod inspect;
pub mod solve;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gibbs_algo::GibbsProblem;
use gibbs_cli::RunFile;
use gibbs_core::Database;
use tracing::info;

/// Load the database and run file and build the problem.
pub fn load_problem(database: &Path, run: &Path) -> Result<(GibbsProblem, RunFile)> {
    let db = Database::from_path(database)
        .with_context(|| format!("loading database {}", database.display()))?;
    let run = RunFile::load(run)?;
    info!(
        phases = db.phases.len(),
        parameters = db.parameters.len(),
        "loaded database"
    );
    let problem =
        GibbsProblem::new(&db, &run.conditions).context("building the minimization problem")?;
    Ok((problem, run))
}

/// Write rendered output to `out`, or stdout when absent.
pub fn emit(rendered: &[u8], out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote result");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
