#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::config::{CliArgs, RunConfig};
use cli::runner::run;
use cli::telemetry::init_telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance when many workers allocate batches
// concurrently.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let token = CancellationToken::new();
    tokio::spawn(shutdown_signal(token.clone(), config.duration));

    let summary = run(config, tokio::io::stdout(), token).await?;
    tracing::info!(
        "Stopped after emitting {} items ({} written)",
        summary.emitted,
        summary.written
    );
    Ok(())
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting with full config: {:#?}", config);
    } else {
        tracing::info!("Starting with {} workers", config.workers);
    }
}

/// Cancels `token` on Ctrl+C, SIGTERM or once `duration` has elapsed.
async fn shutdown_signal(token: CancellationToken, duration: Option<core::time::Duration>) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = deadline => tracing::info!("Run duration elapsed"),
        () = token.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, stopping workers...");
    token.cancel();
}
