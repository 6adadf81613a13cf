//! HTTP client for a JSON race-data API.
//!
//! Endpoints:
//! - `GET {base}/v1/{year}/schedule` → [`Schedule`]
//! - `GET {base}/v1/{year}/{round}/session` → [`Session`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::traits::RaceDataProvider;
use crate::types::{Schedule, Session};
use crate::{PaddockError, Result};

/// Default base URL for the race-data API.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Transport-level timeout. Kept above the executor deadline so the
/// executor, not reqwest, decides when a caller stops waiting.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// [`RaceDataProvider`] backed by an HTTP JSON API.
#[derive(Clone)]
pub struct HttpProvider {
    http: Client,
    base_url: String,
}

impl HttpProvider {
    /// Create a provider for the API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_request_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a provider with a custom transport timeout.
    pub fn with_request_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaddockError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!(url, "fetching from upstream");
        let response = self.http.get(url).send().await?;
        check_status(&response, what)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Map a non-success status to the provider error contract.
fn check_status(response: &reqwest::Response, what: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(PaddockError::RateLimited { retry_after })
        }
        StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(PaddockError::NotFound(what.to_string()))
        }
        code => Err(PaddockError::Api {
            status: code.as_u16(),
            message: format!("race data API error for {what}: {status}"),
        }),
    }
}

#[async_trait]
impl RaceDataProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn load_session(&self, year: i32, round: u32) -> Result<Session> {
        let url = format!("{}/v1/{year}/{round}/session", self.base_url);
        self.get_json(&url, &format!("session {year}/{round}")).await
    }

    async fn load_schedule(&self, year: i32) -> Result<Schedule> {
        let url = format!("{}/v1/{year}/schedule", self.base_url);
        self.get_json(&url, &format!("schedule {year}")).await
    }
}
