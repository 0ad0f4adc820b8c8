//! wiremock stand-ins for the review API and the Telegram Bot API

use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::BOT_TOKEN;

/// Review API path served by [`mount_review_api`]
pub const REVIEW_PATH: &str = "/api/user_api/homework_statuses/";

/// Serve `status` with `body` for every homework status request
pub async fn mount_review_api(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(REVIEW_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Accept every `sendMessage` call
pub async fn mount_telegram_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{BOT_TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1, "chat": {"id": 100500}, "text": "ok"}
        })))
        .mount(server)
        .await;
}

/// Texts of every `sendMessage` call the server has seen, in order
pub async fn sent_texts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter_map(|body| body["text"].as_str().map(str::to_string))
        .collect()
}

/// `from_date` values of every review API request, in order
pub async fn requested_watermarks(server: &MockServer) -> Vec<i64> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "from_date")
                .and_then(|(_, value)| value.parse().ok())
        })
        .collect()
}

/// Wait until `server` has seen at least `count` requests
pub async fn wait_for_requests(server: &MockServer, count: usize, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        let seen = server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0);
        if seen >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
