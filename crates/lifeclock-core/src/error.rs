//! Error taxonomy for the report engine.

use thiserror::Error;

/// Errors the report pipeline can surface.
///
/// `InvalidInput` means the caller handed us a malformed phase sequence; it is never
/// recovered internally, and the caller is expected to send the user back to the
/// quiz flow. `Integrity` means a produced artifact broke its own contract (e.g. a
/// revelation count other than 47) and signals a bug in the pipeline, not a normal
/// user-facing condition.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("integrity violation: {0}")]
    Integrity(String),
}

impl ReportError {
    /// Shorthand for `InvalidInput` with a formatted message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ReportError::InvalidInput(msg.into())
    }
}
