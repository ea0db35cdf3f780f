//! Data Transfer Objects for API requests and responses

use bucket_core::{Network, ProtocolError};
use serde::{Deserialize, Serialize};
use sui_rpc_client::EventId;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the protocol object cannot be read
    pub status: String,
    pub version: String,
    pub network: Network,
    pub protocol_reachable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl HealthResponse {
    pub fn new(network: Network, check: Result<(), ProtocolError>) -> Self {
        let error = check.err().map(|e| ApiError::from(&e));
        Self {
            status: if error.is_none() { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            network,
            protocol_reachable: error.is_none(),
            error,
        }
    }
}

/// Event cursor of a bottle listing, as query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottlesQuery {
    pub tx_digest: Option<String>,
    pub event_seq: Option<String>,
}

impl BottlesQuery {
    /// Both parts must be present to continue a listing
    pub fn cursor(self) -> Option<EventId> {
        match (self.tx_digest, self.event_seq) {
            (Some(tx_digest), Some(event_seq)) => Some(EventId {
                tx_digest,
                event_seq,
            }),
            _ => None,
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ProtocolError> for ApiError {
    fn from(err: &ProtocolError) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}
