use crate::config::EtlConfig;
use crate::constants::RETRYABLE_STATUSES;
use crate::error::Result;
use std::time::Duration;
use tracing::warn;

/// reqwest client with a request timeout and bounded retries.
///
/// Connect/timeout errors and 429/5xx gateway statuses are retried with
/// exponential backoff; the last response or error is handed back as is.
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    client: reqwest::Client,
    max_retries: u32,
    base_backoff: Duration,
}

impl RetryingHttpClient {
    pub fn new(timeout: Duration, max_retries: u32, base_backoff: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_retries,
            base_backoff,
        })
    }

    pub fn from_config(config: &EtlConfig) -> Result<Self> {
        Self::new(
            Duration::from_secs(config.http_timeout_secs),
            config.retry_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.send_with_retry(|| self.client.get(url)).await
    }

    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        let payload = serde_json::to_vec(body)?;
        self.send_with_retry(|| {
            self.client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload.clone())
        })
        .await
    }

    /// `build` is called once per attempt since a request builder is consumed by `send`.
    pub async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = build().send().await;
            let retryable = match &outcome {
                Ok(resp) => RETRYABLE_STATUSES.contains(&resp.status().as_u16()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if !retryable || attempt >= self.max_retries {
                return Ok(outcome?);
            }

            let delay = self.backoff(attempt);
            match &outcome {
                Ok(resp) => warn!(
                    "Request to {} returned {}, retrying in {:?} ({}/{})",
                    resp.url(),
                    resp.status().as_u16(),
                    delay,
                    attempt + 1,
                    self.max_retries
                ),
                Err(e) => warn!(
                    "Request failed: {}, retrying in {:?} ({}/{})",
                    e,
                    delay,
                    attempt + 1,
                    self.max_retries
                ),
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}
