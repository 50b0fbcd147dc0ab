use std::io;
use std::process::ExitCode;

use clap::Parser;
use gibbs_cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::solve::SolveArgs;

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Solve {
            database,
            run,
            backend,
            max_iter,
            tol,
            format,
            out,
        } => commands::solve::handle(SolveArgs {
            database,
            run,
            backend: backend.as_deref(),
            max_iter: *max_iter,
            tol: *tol,
            format: *format,
            out: out.as_deref(),
        }),
        Commands::Inspect {
            database,
            run,
            format,
        } => commands::inspect::handle(database, run, *format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG directives take precedence over --log-level
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
