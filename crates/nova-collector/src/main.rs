use std::io::Write;
use std::process::ExitCode;

use nova_inventory::{InventoryUpdate, NovaSource};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What gets printed on stdout for the host platform to merge.
#[derive(Serialize)]
struct CollectionReport<'a> {
    region: Option<&'a str>,
    #[serde(flatten)]
    update: &'a InventoryUpdate,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "inventory collection failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BoxError> {
    let source = NovaSource::from_env()?;

    let update = nova_inventory::run_cycle(&source).await?;

    let report = CollectionReport {
        region: source.region(),
        update: &update,
    };

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;

    Ok(())
}
