use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimize the Gibbs energy for a database and a run file
    Solve {
        /// Thermodynamic database (TOML, or JSON by extension)
        #[arg(long, value_hint = ValueHint::FilePath)]
        database: PathBuf,
        /// Run file with `[conditions]` and an optional `[solver]` table
        #[arg(long, value_hint = ValueHint::FilePath)]
        run: PathBuf,
        /// Solver backend (lbfgs, ipopt)
        #[arg(long)]
        backend: Option<String>,
        /// Override the run file's iteration limit
        #[arg(long)]
        max_iter: Option<usize>,
        /// Override the run file's convergence tolerance
        #[arg(long)]
        tol: Option<f64>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the NLP sizes, variable map and constraint catalogue
    Inspect {
        #[arg(long, value_hint = ValueHint::FilePath)]
        database: PathBuf,
        #[arg(long, value_hint = ValueHint::FilePath)]
        run: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
