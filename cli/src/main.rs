//! Mimipanel - host provisioner for the Mimipanel control panel

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mimipanel_cli::cli::Cli;
use mimipanel_cli::output::OutputContext;

/// Variable holding a `tracing` filter directive.
const LOG_ENV: &str = "MIMIPANEL_LOG";

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let no_color = cli.no_color;
    if let Err(e) = cli.run().await {
        OutputContext::new(no_color, true).error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
