use crate::report::{
    run_country_report, run_normalize, run_series_report, run_studies_report, CountryArgs,
    NormalizeArgs, SeriesArgs, StudiesArgs,
};
use crate::server;
use civi::config::AppConfig;
use civi::error::AppError;
use civi::telemetry;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Critical Infrastructure Vitals Index",
    about = "Serve and inspect the Critical Infrastructure Vitals Index from the command line",
    version
)]
struct Cli {
    /// Override the configured snapshot directory (CIVI_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a country's pillar and industry scores
    Country(CountryArgs),
    /// Print a historical score series for one selection
    Series(SeriesArgs),
    /// Filter and page the case-study collection
    Studies(StudiesArgs),
    /// Normalize a raw metric export and score it against a catalog
    Normalize(NormalizeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let mut config = AppConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.root = data_dir;
    }
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Country(args) => run_country_report(&config, args),
        Command::Series(args) => run_series_report(&config, args),
        Command::Studies(args) => run_studies_report(&config, args),
        Command::Normalize(args) => run_normalize(args),
    }
}
