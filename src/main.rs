use homework_bot::config::LogConfig;
use homework_bot::{Config, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Reads `.env` as well, so the log settings below can come from it
    let config = Config::from_env();

    let log_config = LogConfig::from_lookup(|key| std::env::var(key).ok());
    let _log_guard = match logging::init(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("homework-bot: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "cannot start without configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        endpoint = %config.api.endpoint,
        chat_id = %config.credentials.chat_id,
        "starting homework bot"
    );

    match homework_bot::run_with_shutdown(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "homework bot stopped");
            ExitCode::FAILURE
        }
    }
}
