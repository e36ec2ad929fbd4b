//! Report API client
//!
//! `ReportApi` is the seam between the offline core and the server. The
//! sync engine only ever calls `submit`; `list` feeds the report list
//! screen and `check_status` feeds the connectivity monitor.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::client::config::Config;
use crate::client::error::RemoteError;
use crate::shared::{Report, ReportPayload};

/// Timeout for the reachability probe
pub const STATUS_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Remote report storage
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// Submit one report; any non-2xx answer is an error
    async fn submit(&self, payload: &ReportPayload) -> Result<(), RemoteError>;

    /// Fetch all stored reports
    async fn list(&self) -> Result<Vec<Report>, RemoteError>;

    /// Cheap request telling whether the server is reachable
    async fn check_status(&self) -> Result<(), RemoteError>;
}

/// `ReportApi` over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpReportApi {
    config: Config,
    client: Client,
}

impl HttpReportApi {
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.submit_timeout())
            .build()
            .map_err(|e| RemoteError::network(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!("Using report API at {}", config.server_url());
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        Err(RemoteError::rejected(status.as_u16(), body))
    }
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn submit(&self, payload: &ReportPayload) -> Result<(), RemoteError> {
        let url = self.config.api_url("/reports");

        let response = self.client.post(&url).json(payload).send().await?;
        Self::error_for_status(response).await?;

        tracing::debug!("Report '{}' accepted by {}", payload.title, url);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Report>, RemoteError> {
        let url = self.config.api_url("/reports");

        let response = self.client.get(&url).send().await?;
        let response = Self::error_for_status(response).await?;
        Ok(response.json::<Vec<Report>>().await?)
    }

    async fn check_status(&self) -> Result<(), RemoteError> {
        let url = self.config.api_url("/");

        let response = self
            .client
            .get(&url)
            .timeout(STATUS_CHECK_TIMEOUT)
            .send()
            .await?;
        Self::error_for_status(response).await?;
        Ok(())
    }
}
