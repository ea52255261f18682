use thiserror::Error;

/// Delivery failure reported by a tracker. Never shown to the visitor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("tracker unavailable: {0}")]
    Unavailable(String),

    #[error("tracker rejected event: {0}")]
    Rejected(String),

    #[error("failed to encode event properties: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local storage is not available")]
    Unavailable,

    #[error("failed to read key '{0}'")]
    Read(String),

    #[error("failed to write key '{0}'")]
    Write(String),

    #[error("stored events are not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to serialize events: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors that send the interaction controller into its failed state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunnelError {
    #[error("invalid navigation target '{0}'")]
    InvalidTarget(String),

    #[error("navigation failed: {0}")]
    Navigation(String),
}
