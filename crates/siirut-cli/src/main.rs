use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use siirut_client::{ClientConfig, RutService};
use tracing_subscriber::EnvFilter;

/// Look up a Chilean taxpayer in the SII registry and print it as JSON.
#[derive(Parser)]
#[command(name = "siirut", version)]
struct Cli {
    /// RUT to look up, with or without dots and hyphen (e.g. 12.345.678-5).
    rut: String,

    /// Timeout in seconds for each request to the SII.
    #[arg(long, env = "SIIRUT_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("siirut v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = ClientConfig::default().with_timeout(Duration::from_secs(cli.timeout_secs));
    let service = RutService::new(&config).context("building HTTP client")?;

    let response = service.fetch_response(&cli.rut).await;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");

    Ok(if response.is_found() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
