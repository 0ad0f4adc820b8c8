//! Configuration types for homework-bot
//!
//! Everything is read once at start-up from the process environment (a `.env`
//! file is honoured through `dotenvy`). The three secrets are mandatory; every
//! other setting has a default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::Duration};

/// Environment key holding the review API token
pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
/// Environment key holding the Telegram bot token
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
/// Environment key holding the destination chat id
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Average month length in seconds, as used by the review service
pub const MONTH_IN_SECS: u64 = 2_629_743;

/// Secrets needed to talk to both remote services
///
/// `Debug` output is redacted so the struct can sit inside logged values.
#[derive(Clone, Default)]
pub struct Credentials {
    /// OAuth token for the review API
    pub practicum_token: String,
    /// Telegram bot token
    pub telegram_token: String,
    /// Telegram chat that receives notifications
    pub chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Review API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Homework status endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// How far back the first watermark reaches (default: three months)
    #[serde(default = "default_lookback", with = "duration_serde")]
    pub lookback: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            lookback: default_lookback(),
        }
    }
}

/// How the `from_date` watermark moves between polls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPolicy {
    /// Start at now minus the lookback, then advance after every successful fetch
    #[default]
    Sliding,
    /// Always ask for now minus the lookback
    Lookback,
}

impl std::str::FromStr for WatermarkPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sliding" => Ok(WatermarkPolicy::Sliding),
            "lookback" => Ok(WatermarkPolicy::Lookback),
            other => Err(format!(
                "unknown watermark policy '{other}' (expected 'sliding' or 'lookback')"
            )),
        }
    }
}

/// Poll loop behaviour
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollConfig {
    /// Fixed sleep between iterations (default: 600 seconds)
    #[serde(default = "default_retry_interval", with = "duration_serde")]
    pub retry_interval: Duration,

    /// Watermark policy (default: sliding)
    #[serde(default)]
    pub watermark: WatermarkPolicy,

    /// Consecutive failed iterations before a failure notice is sent (0 = never)
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_interval: default_retry_interval(),
            watermark: WatermarkPolicy::default(),
            escalation_threshold: default_escalation_threshold(),
        }
    }
}

/// Telegram Bot API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL (default: "https://api.telegram.org")
    #[serde(default = "default_telegram_url")]
    pub api_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_url(),
            timeout: default_timeout(),
        }
    }
}

/// Log sink settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for rotated log files (None = console only)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// File name prefix for rotated logs (default: "homework-bot")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Rotated files kept on disk (default: 5)
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Filter used when `RUST_LOG` is not set (default: "info")
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: default_file_prefix(),
            max_files: default_max_files(),
            default_filter: default_filter(),
        }
    }
}

impl LogConfig {
    /// Log settings only, so the sink can be set up before secrets are checked
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            dir: lookup("LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            ..Default::default()
        }
    }
}

/// Main configuration for the bot
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Secrets, never serialized
    #[serde(skip)]
    pub credentials: Credentials,

    /// Review API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Poll loop settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Telegram settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Missing or empty secrets are reported together in one
    /// [`Error::Config`]; `key` names the first one missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = [PRACTICUM_TOKEN, TELEGRAM_TOKEN, TELEGRAM_CHAT_ID]
            .into_iter()
            .filter(|key| get(*key).is_none())
            .collect();
        if let Some(first) = missing.first() {
            return Err(Error::config(
                *first,
                format!(
                    "missing required environment variables: {}",
                    missing.join(", ")
                ),
            ));
        }

        let mut config = Config {
            credentials: Credentials {
                practicum_token: get(PRACTICUM_TOKEN).unwrap_or_default(),
                telegram_token: get(TELEGRAM_TOKEN).unwrap_or_default(),
                chat_id: get(TELEGRAM_CHAT_ID).unwrap_or_default(),
            },
            ..Default::default()
        };

        if let Some(endpoint) = get("PRACTICUM_ENDPOINT") {
            config.api.endpoint = endpoint;
        }
        if let Some(api_url) = get("TELEGRAM_API_URL") {
            config.telegram.api_url = api_url;
        }
        if let Some(secs) = parse_u64(&get, "RETRY_INTERVAL_SECS")? {
            config.poll.retry_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&get, "HTTP_TIMEOUT_SECS")? {
            config.api.timeout = Duration::from_secs(secs);
            config.telegram.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&get, "LOOKBACK_SECS")? {
            config.api.lookback = Duration::from_secs(secs);
        }
        if let Some(policy) = get("WATERMARK_POLICY") {
            config.poll.watermark = policy
                .parse()
                .map_err(|e: String| Error::config("WATERMARK_POLICY", e))?;
        }
        if let Some(threshold) = parse_u64(&get, "ESCALATION_THRESHOLD")? {
            config.poll.escalation_threshold = u32::try_from(threshold)
                .map_err(|_| Error::config("ESCALATION_THRESHOLD", "value is too large"))?;
        }
        config.logging = LogConfig::from_lookup(&lookup);

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.credentials.practicum_token.is_empty()
            || self.credentials.telegram_token.is_empty()
            || self.credentials.chat_id.is_empty()
        {
            return Err(Error::Config {
                message: "credentials are incomplete".into(),
                key: None,
            });
        }
        for (key, value) in [
            ("PRACTICUM_ENDPOINT", &self.api.endpoint),
            ("TELEGRAM_API_URL", &self.telegram.api_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::config(key, format!("invalid URL '{value}': {e}")))?;
        }
        if self.poll.retry_interval.is_zero() {
            return Err(Error::config(
                "RETRY_INTERVAL_SECS",
                "retry interval must be greater than zero",
            ));
        }
        if i64::try_from(self.api.lookback.as_secs()).is_err() {
            return Err(Error::config(
                "LOOKBACK_SECS",
                format!("lookback must not exceed {} seconds", i64::MAX),
            ));
        }
        if self.api.timeout.is_zero() || self.telegram.timeout.is_zero() {
            return Err(Error::config(
                "HTTP_TIMEOUT_SECS",
                "timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_u64<G>(get: &G, key: &str) -> Result<Option<u64>>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| Error::config(key, format!("expected an integer, got '{raw}'")))
        })
        .transpose()
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_lookback() -> Duration {
    Duration::from_secs(MONTH_IN_SECS * 3)
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(600)
}

fn default_escalation_threshold() -> u32 {
    5
}

fn default_file_prefix() -> String {
    "homework-bot".to_string()
}

fn default_max_files() -> usize {
    5
}

fn default_filter() -> String {
    "info".to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
