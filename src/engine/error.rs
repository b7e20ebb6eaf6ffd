//! Reporter error types

use crate::client::ClientError;
use crate::item::{EventError, MarkerError};

/// Errors that can occur while collecting or reporting a session
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Marker error: {0}")]
    Marker(#[from] MarkerError),

    #[error("TestRail client error: {0}")]
    Client(#[from] ClientError),

    #[error("Event stream error: {0}")]
    Event(#[from] EventError),

    #[error("Unexpected add_run response: {0}")]
    UnexpectedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
