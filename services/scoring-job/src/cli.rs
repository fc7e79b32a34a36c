use crate::job::{run_explain, run_scoring};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use reform_readiness::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reform-readiness-job",
    about = "Score anonymous renovation journeys for outreach readiness",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import events, score every identity and write the score file (default command)
    Run(RunArgs),
    /// Show the full component breakdown for one identity
    Explain(ExplainArgs),
}

/// Inputs shared by every command; unset values fall back to the environment configuration.
#[derive(Args, Debug, Default)]
pub(crate) struct InputArgs {
    /// Event export to score
    #[arg(long)]
    pub(crate) events_csv: Option<PathBuf>,
    /// JSON file with feature and scoring settings
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,
    /// Reference instant (RFC 3339, or YYYY-MM-DD for the end of that UTC day). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_as_of)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
    /// Score file to write (defaults to <output dir>/scores_YYYYMMDD.csv)
    #[arg(long)]
    pub(crate) output_csv: Option<PathBuf>,
    /// Also write the extracted feature records to this file
    #[arg(long)]
    pub(crate) features_csv: Option<PathBuf>,
    /// Number of identities to list in the summary
    #[arg(long, value_parser = crate::infra::parse_top)]
    pub(crate) top: Option<usize>,
    /// Print the run summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    /// Identity to explain
    #[arg(long)]
    pub(crate) identity: String,
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
    /// Print the breakdown as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => run_scoring(args),
        Command::Explain(args) => run_explain(args),
    }
}
