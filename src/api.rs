//! Client for the homework review API
//!
//! One endpoint, one query parameter: `GET {endpoint}?from_date={unix}` with
//! an `Authorization: OAuth {token}` header. The body is handed back as raw
//! JSON so shape problems are reported by [`crate::validator`], not by serde.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Source of homework status snapshots
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch every homework updated since `from_date` (Unix seconds)
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the endpoint could not be reached
    /// - [`Error::Fetch`] if it answered with a non-success status
    /// - [`Error::Serialization`] if the body is not JSON
    async fn fetch(&self, from_date: i64) -> Result<Value>;
}

/// `reqwest`-backed client for the review service
pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    auth_header: String,
}

impl PracticumClient {
    /// Build a client for `config.endpoint` authenticated with `token`
    pub fn new(config: &ApiConfig, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            auth_header: format!("OAuth {token}"),
        })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        debug!(endpoint = %self.endpoint, from_date, "requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
