use crate::app::ports::RunTracker;
use crate::constants::TRACKER_RUNS_PATH;
use crate::error::{EtlError, Result};
use crate::infra::http_client::RetryingHttpClient;
use crate::types::RunSummary;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// JSON body expected by the tracking API
#[derive(Debug, Serialize)]
pub struct TrackerPayload<'a> {
    #[serde(rename = "cantidadDatos")]
    pub count: usize,
    #[serde(rename = "fechaEjecucion")]
    pub timestamp: String,
    #[serde(rename = "descripcion")]
    pub description: &'a str,
}

impl<'a> From<&'a RunSummary> for TrackerPayload<'a> {
    fn from(summary: &'a RunSummary) -> Self {
        Self {
            count: summary.count,
            timestamp: summary.timestamp.to_rfc3339(),
            description: &summary.description,
        }
    }
}

/// Registers run summaries with the tracking API over HTTP
pub struct HttpRunTracker {
    http: RetryingHttpClient,
    endpoint: String,
}

impl HttpRunTracker {
    pub fn new(http: RetryingHttpClient, api_base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", api_base_url.trim_end_matches('/'), TRACKER_RUNS_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RunTracker for HttpRunTracker {
    #[instrument(skip(self, summary), fields(run_id = %summary.run_id, count = summary.count))]
    async fn register(&self, summary: &RunSummary) -> Result<()> {
        info!("Registering ETL run at {}", self.endpoint);
        let payload = TrackerPayload::from(summary);
        let response = self
            .http
            .post_json(&self.endpoint, &payload)
            .await
            .map_err(|e| EtlError::Reporting {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != StatusCode::CREATED {
            return Err(EtlError::Reporting {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        debug!("Tracker response: {}", body);
        Ok(())
    }
}
