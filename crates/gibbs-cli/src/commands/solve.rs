//! `gibbs solve`: build the problem, run a backend, report the equilibrium.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use gibbs_algo::{select_backend, GibbsSolution};
use gibbs_cli::OutputFormat;
use tabwriter::TabWriter;
use tracing::{info, warn};

use super::{emit, load_problem};

pub struct SolveArgs<'a> {
    pub database: &'a Path,
    pub run: &'a Path,
    pub backend: Option<&'a str>,
    pub max_iter: Option<usize>,
    pub tol: Option<f64>,
    pub format: OutputFormat,
    pub out: Option<&'a Path>,
}

pub fn handle(args: SolveArgs<'_>) -> Result<()> {
    let (problem, run) = load_problem(args.database, args.run)?;
    let config = run.solver_config(args.max_iter, args.tol);
    let backend = select_backend(args.backend.or(run.backend.as_deref()))?;

    info!(backend = backend.id(), ?config, "solving");
    let solution = backend
        .solve(&problem, &config)
        .with_context(|| format!("{} backend failed", backend.id()))?;

    if !solution.converged() {
        warn!(
            status = %solution.status,
            violation = solution.constraint_violation,
            "solver did not converge; reporting the last point"
        );
    }
    info!(
        status = %solution.status,
        iterations = solution.iterations,
        elapsed_ms = solution.solve_time_ms as u64,
        "solve finished"
    );

    let rendered = match args.format {
        OutputFormat::Plain => render_plain(&solution)?,
        OutputFormat::Json => {
            let mut text = serde_json::to_vec_pretty(&solution)?;
            text.push(b'\n');
            text
        }
    };
    emit(&rendered, args.out)
}

/// Summary block followed by a site fraction table and a mole fraction table.
pub fn render_plain(solution: &GibbsSolution) -> Result<Vec<u8>> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "status\t{}", solution.status)?;
    writeln!(writer, "objective\t{:.4} J/mol", solution.objective)?;
    writeln!(writer, "iterations\t{}", solution.iterations)?;
    writeln!(writer, "violation\t{:.3e}", solution.constraint_violation)?;
    writeln!(writer)?;

    writeln!(writer, "PHASE\tFRACTION\tSUBLATTICE\tSPECIES\tSITE FRACTION")?;
    for (name, phase) in &solution.phases {
        for (s, occupancy) in phase.sublattices.iter().enumerate() {
            for (species, y) in &occupancy.site_fractions {
                writeln!(
                    writer,
                    "{}\t{:.6}\t{}\t{}\t{:.6}",
                    name, phase.fraction, s, species, y
                )?;
            }
        }
    }
    writeln!(writer)?;

    writeln!(writer, "PHASE\tSPECIES\tMOLE FRACTION")?;
    for (name, phase) in &solution.phases {
        for (species, x) in phase.mole_fractions() {
            writeln!(writer, "{}\t{}\t{:.6}", name, species, x)?;
        }
    }
    writer.flush()?;
    Ok(writer.into_inner()?)
}
