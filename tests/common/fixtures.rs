//! Canned review API payloads and configuration builders

use homework_bot::config::{ApiConfig, PollConfig, TelegramConfig};
use homework_bot::{Config, Credentials, WatermarkPolicy};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;

/// Fixed start time for [`homework_bot::ManualClock`]
pub const START: i64 = 1_700_000_000;

/// Chat id used throughout the tests
pub const CHAT_ID: &str = "100500";

/// Bot token used throughout the tests
pub const BOT_TOKEN: &str = "4242:TEST";

/// Review API payload with a single homework
pub fn single_homework(name: &str, status: &str) -> Value {
    json!({
        "homeworks": [{
            "id": 1,
            "homework_name": name,
            "status": status,
            "reviewer_comment": "",
            "date_updated": "2023-11-14T22:13:20Z",
            "lesson_name": "Sprint 6"
        }],
        "current_date": START
    })
}

/// Review API payload without homeworks
pub fn no_homeworks() -> Value {
    json!({"homeworks": [], "current_date": START})
}

/// Config pointing both collaborators at local mock servers
pub fn config_for(api_uri: &str, telegram_uri: &str, policy: WatermarkPolicy) -> Config {
    Config {
        credentials: Credentials {
            practicum_token: "practicum-token".into(),
            telegram_token: BOT_TOKEN.into(),
            chat_id: CHAT_ID.into(),
        },
        api: ApiConfig {
            endpoint: format!("{api_uri}/api/user_api/homework_statuses/"),
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
        poll: PollConfig {
            retry_interval: Duration::from_secs(600),
            watermark: policy,
            escalation_threshold: 0,
        },
        telegram: TelegramConfig {
            api_url: telegram_uri.to_string(),
            timeout: Duration::from_secs(5),
        },
        ..Default::default()
    }
}

/// Environment the binary would see, pointed at local mock servers
pub fn env_for(api_uri: &str, telegram_uri: &str) -> HashMap<String, String> {
    [
        ("PRACTICUM_TOKEN", "practicum-token".to_string()),
        ("TELEGRAM_TOKEN", BOT_TOKEN.to_string()),
        ("TELEGRAM_CHAT_ID", CHAT_ID.to_string()),
        (
            "PRACTICUM_ENDPOINT",
            format!("{api_uri}/api/user_api/homework_statuses/"),
        ),
        ("TELEGRAM_API_URL", telegram_uri.to_string()),
        ("RETRY_INTERVAL_SECS", "1".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
