mod cli;
mod config;
mod error;

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rigctl_core::FleetScheduler;

use crate::cli::Cli;
use crate::error::{exit_code, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let resolved = match config::resolve(&cli) {
        Ok(resolved) => resolved,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    };

    // Keep the non-blocking writer guard alive for the process lifetime.
    let _guard = init_tracing(cli.verbose, resolved.log_file.as_deref());

    if let Err(err) = run(resolved).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(resolved: config::Resolved) -> Result<(), CliError> {
    info!(
        base_url = %resolved.fleet.base_url,
        miners = resolved.fleet.miners.len(),
        workers = resolved.fleet.max_workers,
        retries = resolved.fleet.max_attempts,
        cycles = ?resolved.fleet.cycles,
        "starting fleet controller"
    );

    let scheduler = FleetScheduler::new(resolved.fleet)?;
    scheduler.run().await;

    info!("fleet controller stopped");
    Ok(())
}

fn init_tracing(
    verbosity: u8,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match log_file {
        Some(path) => {
            let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("rigctl: cannot open log file {}: {e}", path.display());
                    std::process::exit(exit_code::USAGE);
                }
            };
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    }
}
