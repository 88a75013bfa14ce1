use crate::report::{run_report, run_score, ReportArgs, ScoreArgs};
use crate::server;
use aquatac::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aquatac",
    about = "Serve and inspect water-quality sensor readings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single set of measurements and print its safety flags
    Score(ScoreArgs),
    /// Summarize a JSON or CSV snapshot export
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the in-memory store from a snapshot (overrides AQUATAC_SEED_PATH)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => {
            run_score(args);
            Ok(())
        }
        Command::Report(args) => run_report(args).await,
    }
}
