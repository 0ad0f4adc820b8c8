//! Log sink set-up
//!
//! Console output always; a daily-rotated file under `LogConfig::dir` when one
//! is configured. `RUST_LOG` overrides the configured default filter. Each line
//! carries timestamp, level, target and message.

use crate::config::LogConfig;
use crate::error::{Error, Result};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Install the global subscriber
///
/// Keep the returned guard alive for the lifetime of the process; dropping it
/// flushes and stops the file writer.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    let (subscriber, guard) = build_subscriber(config, filter)?;

    tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::Config {
        message: format!("failed to install log subscriber: {e}"),
        key: None,
    })?;

    Ok(guard)
}

fn build_subscriber(
    config: &LogConfig,
    filter: EnvFilter,
) -> Result<(Box<dyn Subscriber + Send + Sync>, Option<WorkerGuard>)> {
    let console = fmt::layer().with_target(true);

    let (file, guard) = match file_appender(config)? {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file);

    Ok((Box::new(subscriber), guard))
}

fn file_appender(config: &LogConfig) -> Result<Option<RollingFileAppender>> {
    let Some(dir) = &config.dir else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir).map_err(|e| {
        Error::config(
            "LOG_DIR",
            format!("cannot create log directory {}: {e}", dir.display()),
        )
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(dir)
        .map_err(|e| Error::config("LOG_DIR", format!("cannot open log file: {e}")))?;

    Ok(Some(appender))
}
