//! CLI entry point.

use clap::Parser;
use opoint::DefaultSafefeedClient;
use opoint_cli::{Cli, CliError, runner};
use tracing_subscriber::EnvFilter;

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.to_config()?;
    let mut client = DefaultSafefeedClient::new(&config).map_err(CliError::from)?;

    tracing::info!(
        lastid = %client.lastid(),
        format = %cli.format,
        "Polling Safefeed"
    );

    let mut stdout = std::io::stdout().lock();
    let written = runner::poll(&mut client, cli.format, cli.batches, &mut stdout).await?;
    tracing::info!(batches = written, lastid = %client.lastid(), "Done");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only feed data
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        tracing::error!("{e:#}");
        std::process::exit(code);
    }
}
