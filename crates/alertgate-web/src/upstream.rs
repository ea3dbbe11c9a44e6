//! HTTP client for the alerts.in.ua API.

use alertgate_core::{AlertSnapshot, AlertSource, UpstreamError};
use async_trait::async_trait;

const ALERTS_PATH: &str = "/v1/iot/active_air_raid_alerts_by_oblast.json";

pub struct HttpAlertSource {
    client: reqwest::Client,
    url: String,
    api_token: String,
}

impl HttpAlertSource {
    pub fn new(base_url: &str, api_token: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("alertgate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), ALERTS_PATH),
            api_token: api_token.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AlertSource for HttpAlertSource {
    async fn fetch_statuses(&self) -> Result<AlertSnapshot, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        Ok(AlertSnapshot(body))
    }
}
