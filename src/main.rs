//! Main entry point for the zipwalk CLI application.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use zipwalk::{Cli, ConsoleSink, ScanConfig, Scanner, logging};

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Application entry point.
///
/// Help and version requests exit successfully, usage errors exit with
/// clap's status 2, configuration errors with 1. Archives that fail to
/// open do not affect the exit status.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = ScanConfig::from_cli(cli)?;
    debug!(?config, "resolved configuration");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let sink = Arc::new(ConsoleSink::new(config.raw));
    let summary = Scanner::new(config, sink)
        .with_cancellation(cancel)
        .scan()
        .await?;

    if summary.cancelled {
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}
