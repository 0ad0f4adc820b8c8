//! The poll loop
//!
//! Each iteration fetches the homework list from the review API, maps the
//! latest homework to a notification and forwards it to the chat unless it is
//! identical to the last message sent. Errors never leave an iteration: they
//! are classified, logged and turned into a [`PollOutcome::Failed`].
//!
//! # Watermark
//!
//! With [`WatermarkPolicy::Sliding`] the first fetch asks for everything since
//! `now - lookback`. After every healthy iteration the watermark moves to the
//! server's `current_date` (or to the time the fetch started when the server
//! does not report one). A failed iteration keeps the old watermark so nothing
//! is skipped. [`WatermarkPolicy::Lookback`] always asks for `now - lookback`.
//!
//! # Outage notice
//!
//! A non-success answer from the review API sends "service unavailable" once
//! per failure streak. It shares the dedup slot with status messages; the next
//! healthy iteration clears it so a later outage is reported again.
//!
//! # Escalation
//!
//! When `escalation_threshold` iterations in a row fail, a single
//! "Program failure" notice is sent. It fires once per failure streak and does
//! not take part in message dedup.
//!
//! # Example
//!
//! ```no_run
//! use homework_bot::{Config, Poller};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let poller = Poller::from_config(&config)?;
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(poller.run(shutdown.clone()));
//! # Ok(())
//! # }
//! ```

use crate::api::{HomeworkApi, PracticumClient};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, PollConfig, WatermarkPolicy};
use crate::error::{Error, ErrorKind, Result};
use crate::notifier::{Notifier, TelegramNotifier};
use crate::status::{SERVICE_UNAVAILABLE, failure_message, parse_status};
use crate::types::PollOutcome;
use crate::validator::{check_response, current_date};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// State carried from one iteration to the next
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollState {
    /// `from_date` for the next fetch (sliding policy only)
    pub watermark: Option<i64>,
    /// Last message successfully delivered to the chat
    pub last_message: Option<String>,
    /// Consecutive failed iterations
    pub failure_streak: u32,
}

/// Result of the fetch → validate → map stage
struct Checked {
    /// Notification text, `None` when the homework list was empty
    message: Option<String>,
    /// Watermark to commit if the iteration ends healthy
    next_watermark: i64,
}

/// Periodic homework status checker
pub struct Poller {
    api: Arc<dyn HomeworkApi>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    chat_id: String,
    poll: PollConfig,
    lookback: Duration,
    state: PollState,
}

impl Poller {
    /// Assemble a poller from explicit collaborators
    pub fn new(
        config: &Config,
        api: Arc<dyn HomeworkApi>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            notifier,
            clock,
            chat_id: config.credentials.chat_id.clone(),
            poll: config.poll.clone(),
            lookback: config.api.lookback,
            state: PollState::default(),
        }
    }

    /// Production poller: review API client, Telegram notifier, system clock
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = PracticumClient::new(&config.api, &config.credentials.practicum_token)?;
        debug!(endpoint = api.endpoint(), "review API client ready");
        let notifier = TelegramNotifier::new(&config.telegram, &config.credentials.telegram_token)?;
        Ok(Self::new(
            config,
            Arc::new(api),
            Arc::new(notifier),
            Arc::new(SystemClock),
        ))
    }

    /// State after the most recent iteration
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Run until `shutdown` is cancelled
    ///
    /// Cancellation is honoured between iterations and while sleeping; an
    /// in-flight request is allowed to finish.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll.retry_interval.as_secs(),
            watermark = ?self.poll.watermark,
            "homework poller started"
        );

        while !shutdown.is_cancelled() {
            self.poll_once().await;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.clock.sleep(self.poll.retry_interval) => {}
            }
        }

        info!("homework poller stopped");
    }

    /// Run exactly `iterations` poll-and-sleep cycles
    pub async fn run_for(&mut self, iterations: usize) -> Vec<PollOutcome> {
        let mut outcomes = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            outcomes.push(self.poll_once().await);
            self.clock.sleep(self.poll.retry_interval).await;
        }
        outcomes
    }

    /// One fetch → validate → map → notify pass, without the trailing sleep
    pub async fn poll_once(&mut self) -> PollOutcome {
        let started_at = self.clock.now();
        let from_date = self.from_date(started_at);

        let result = match self.check(from_date, started_at).await {
            Ok(Checked {
                message: None,
                next_watermark,
            }) => {
                info!(from_date, "no homework updates, nothing to send");
                Ok((PollOutcome::Empty, next_watermark))
            }
            Ok(Checked {
                message: Some(message),
                next_watermark,
            }) => self
                .dispatch(message)
                .await
                .map(|outcome| (outcome, next_watermark)),
            Err(e) => Err(e),
        };

        let (outcome, failure) = match result {
            Ok((outcome, next_watermark)) => {
                if self.poll.watermark == WatermarkPolicy::Sliding {
                    self.state.watermark = Some(next_watermark);
                }
                // A later outage must be reported again
                if self.state.last_message.as_deref() == Some(SERVICE_UNAVAILABLE) {
                    self.state.last_message = None;
                }
                (outcome, None)
            }
            Err(e) => (PollOutcome::Failed(e.kind()), Some(e)),
        };

        if outcome.is_failure() {
            self.state.failure_streak += 1;
        } else {
            if self.state.failure_streak > 0 {
                info!(
                    streak = self.state.failure_streak,
                    "recovered after failed iterations"
                );
            }
            self.state.failure_streak = 0;
        }

        if let Some(e) = failure {
            self.handle_error(e).await;
        }
        outcome
    }

    fn from_date(&self, now: i64) -> i64 {
        let lookback = i64::try_from(self.lookback.as_secs()).unwrap_or(i64::MAX);
        let lookback_start = now.saturating_sub(lookback);
        match self.poll.watermark {
            WatermarkPolicy::Sliding => self.state.watermark.unwrap_or(lookback_start),
            WatermarkPolicy::Lookback => lookback_start,
        }
    }

    async fn check(&self, from_date: i64, started_at: i64) -> Result<Checked> {
        debug!(from_date, "fetching homework statuses");
        let response = self.api.fetch(from_date).await?;

        let homeworks = check_response(&response)?;
        let next_watermark = current_date(&response).unwrap_or(started_at);

        let message = match homeworks.first() {
            Some(latest) => Some(parse_status(latest)?),
            None => None,
        };

        Ok(Checked {
            message,
            next_watermark,
        })
    }

    /// Send `message` unless it repeats the last delivered one
    async fn dispatch(&mut self, message: String) -> Result<PollOutcome> {
        if self.state.last_message.as_deref() == Some(message.as_str()) {
            debug!(%message, "message unchanged, skipping send");
            return Ok(PollOutcome::Duplicate);
        }

        self.notifier.send(&self.chat_id, &message).await?;
        info!(%message, "notification sent");

        self.state.last_message = Some(message.clone());
        Ok(PollOutcome::Notified { message })
    }

    /// Log a failed iteration, report outages and escalate long streaks
    async fn handle_error(&mut self, e: Error) {
        error!(
            code = e.error_code(),
            error = %e,
            streak = self.state.failure_streak,
            "poll iteration failed"
        );

        if e.kind() == ErrorKind::Fetch
            && let Err(send_err) = self.dispatch(SERVICE_UNAVAILABLE.to_string()).await
        {
            warn!(error = %send_err, "failed to send service unavailable notice");
        }

        let threshold = self.poll.escalation_threshold;
        if threshold > 0 && self.state.failure_streak == threshold {
            let notice = failure_message(&e);
            match self.notifier.send(&self.chat_id, &notice).await {
                Ok(()) => warn!(streak = threshold, "failure streak escalated to chat"),
                Err(send_err) => {
                    error!(error = %send_err, "failed to send failure escalation")
                }
            }
        }
    }
}
