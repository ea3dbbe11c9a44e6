//! The upstream alert source as seen by the gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// Current alert statuses exactly as the upstream API returned them.
///
/// The shape belongs to the upstream; it is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertSnapshot(pub serde_json::Value);

impl From<serde_json::Value> for AlertSnapshot {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// "Get current alert statuses". One call, no pagination.
#[async_trait]
pub trait AlertSource: Send + Sync {
    async fn fetch_statuses(&self) -> Result<AlertSnapshot, UpstreamError>;
}
