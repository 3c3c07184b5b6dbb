// Failures surfaced by a dashboard fetch
use thiserror::Error;

/// Message shown when a failure carries no usable text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The endpoint answered with a non-success status.
    #[error("API error: {status}")]
    Status { status: u16 },

    /// The body could not be decoded into a snapshot.
    #[error("Failed to decode dashboard response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request to dashboard API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// User-facing text for a failed refresh.
pub fn error_message(error: &dyn std::error::Error) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}
