// main.rs — Terminal entry point.
//
// Startup order:
//   1. `.env` is loaded so GAMESHELF_* variables can live next to the binary
//   2. tracing goes to stderr; RUST_LOG overrides the default filter
//   3. config is read from the environment, the command line is parsed
//   4. the command runs on the tokio runtime; any error exits with status 1

mod cli;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gameshelf_lib::config::AppConfig;

use cli::args::Cli;

/// Warnings from everything, plus the success/info notices the controllers raise.
const DEFAULT_LOG_FILTER: &str = "warn,gameshelf::notice=info";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli, config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
