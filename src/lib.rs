//! # homework-bot
//!
//! Watches the homework review API for status changes on the latest
//! submission and forwards them to a Telegram chat.
//!
//! The pipeline is deliberately linear and single-tasked:
//! fetch ([`api`]) → validate ([`validator`]) → map ([`status`]) →
//! dedup and send ([`poller`], [`notifier`]) → sleep ([`clock`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use homework_bot::{Config, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!
//!     // Polls until SIGINT/SIGTERM
//!     run_with_shutdown(config).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Review API client
pub mod api;
/// Injectable time source
pub mod clock;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Log sink set-up
pub mod logging;
/// Chat notifications
pub mod notifier;
/// The poll loop
pub mod poller;
/// Homework record to notification text
pub mod status;
/// Core types
pub mod types;
/// Response shape checks
pub mod validator;

// Re-export commonly used types
pub use api::{HomeworkApi, PracticumClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Credentials, WatermarkPolicy};
pub use error::{Error, ErrorKind, Result};
pub use notifier::{Notifier, TelegramNotifier};
pub use poller::{PollState, Poller};
pub use types::{HomeworkStatus, PollOutcome};

use tokio_util::sync::CancellationToken;

/// Load configuration through `lookup`, then poll until `shutdown` fires
///
/// Configuration is validated before any client is built, so a missing
/// secret returns [`Error::Config`] without touching the network.
pub async fn run_from_lookup<F>(lookup: F, shutdown: CancellationToken) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    run(&config, shutdown).await
}

/// Poll with `config` until `shutdown` fires
pub async fn run(config: &Config, shutdown: CancellationToken) -> Result<()> {
    let poller = Poller::from_config(config)?;
    poller.run(shutdown).await;
    Ok(())
}

/// Poll with `config` until a termination signal arrives
///
/// SIGTERM or SIGINT on Unix, Ctrl+C elsewhere.
pub async fn run_with_shutdown(config: Config) -> Result<()> {
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    run(&config, shutdown).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            let name = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };
            tracing::info!(signal = name, "shutdown requested, stopping the poller");
        }
        (Ok(mut remaining), Err(e)) | (Err(e), Ok(mut remaining)) => {
            tracing::warn!(error = %e, "one shutdown signal handler unavailable");
            remaining.recv().await;
            tracing::info!("shutdown requested, stopping the poller");
        }
        (Err(e), Err(_)) => {
            tracing::warn!(error = %e, "no shutdown signal handlers, falling back to ctrl_c");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

/// Resolve on Ctrl+C; if it cannot be watched, never resolve so the poller keeps running
async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "ctrl_c", "shutdown requested, stopping the poller"),
        Err(e) => {
            tracing::error!(error = %e, "cannot watch for Ctrl+C, the bot must be killed to stop");
            std::future::pending::<()>().await;
        }
    }
}
