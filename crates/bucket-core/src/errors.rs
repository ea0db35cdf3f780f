//! Error types for the Bucket client

use thiserror::Error;

/// Core errors that can occur in the Bucket client
#[derive(Debug, Error)]
pub enum Error {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TxError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Fullnode connection and query errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Fullnode unreachable at {url}")]
    Unreachable { url: String },

    #[error("Fullnode returned error: {message}")]
    ApiError { message: String },

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Protocol-specific errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Protocol not available on {network}")]
    NetworkNotSupported { network: String },

    #[error("Protocol state unavailable: {reason}")]
    StateUnavailable { reason: String },

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Failed to parse object data: {message}")]
    ObjectParseError { message: String },

    #[error("Upstream call {call} failed: {message}")]
    UpstreamFailed { call: String, message: String },
}

/// Transaction building errors
#[derive(Debug, Error)]
pub enum TxError {
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Invalid move call target: {target}")]
    InvalidTarget { target: String },

    #[error("Invalid type tag: {type_tag}")]
    InvalidTypeTag { type_tag: String },

    #[error("No coins of type {coin_type} owned by sender")]
    NoCoins { coin_type: String },

    #[error("Object input {object_id} is not resolved")]
    UnresolvedObject { object_id: String },

    #[error("Failed to build transaction: {message}")]
    BuildFailed { message: String },

    #[error("Failed to serialize transaction: {message}")]
    SerializationFailed { message: String },
}

/// Result type alias for Bucket client operations
pub type Result<T> = std::result::Result<T, Error>;

impl ProtocolError {
    /// Wrap a failure from a named upstream call
    pub fn upstream(call: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::UpstreamFailed {
            call: call.into(),
            message: err.to_string(),
        }
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NetworkNotSupported { .. } => "network_not_supported",
            Self::StateUnavailable { .. } => "state_unavailable",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::ObjectParseError { .. } => "object_parse_error",
            Self::UpstreamFailed { .. } => "upstream_failed",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAddress { .. } => 400,
            Self::NetworkNotSupported { .. } => 422,
            Self::StateUnavailable { .. } | Self::ObjectParseError { .. } => 503,
            Self::UpstreamFailed { .. } => 502,
        }
    }
}

impl TxError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidTarget { .. } => "invalid_target",
            Self::InvalidTypeTag { .. } => "invalid_type_tag",
            Self::NoCoins { .. } => "no_coins",
            Self::UnresolvedObject { .. } => "unresolved_object",
            Self::BuildFailed { .. } => "build_failed",
            Self::SerializationFailed { .. } => "serialization_failed",
        }
    }
}
