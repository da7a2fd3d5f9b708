use std::fmt;

/// Unified error type for the consentkit crate.
#[derive(Debug, Clone)]
pub enum SdkError {
    /// Network fetch failed or timed out. Non-fatal; the previous status is
    /// retained.
    Transport(String),
    /// Malformed JSON from the status server or the web bridge. The operation
    /// is aborted without partial state changes.
    Protocol(String),
    /// A third-party module is present but lacks the expected entry point.
    ModuleIncompatible(String),
    /// No usable surface to present the consent UI on.
    Presentation(String),
    /// Invalid input provided by the caller.
    InvalidInput(String),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::Transport(msg) => write!(f, "transport error: {msg}"),
            SdkError::Protocol(msg) => write!(f, "protocol error: {msg}"),
            SdkError::ModuleIncompatible(msg) => write!(f, "module incompatible: {msg}"),
            SdkError::Presentation(msg) => write!(f, "presentation error: {msg}"),
            SdkError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            SdkError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for SdkError {}

/// Result type alias using [`SdkError`].
pub type SdkResult<T> = Result<T, SdkError>;
