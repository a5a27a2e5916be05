//! Pipeline error types.

use thiserror::Error;

/// Errors that can occur while building or driving an analysis pass.
///
/// Per-line parse failures are not errors — they are counted and
/// reported through the finalized snapshot.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A user-supplied pattern was rejected at registry construction.
    #[error("invalid pattern {pattern:?}: {reason}")]
    Config { pattern: String, reason: String },

    /// An operation was invoked outside its valid pipeline state.
    #[error("{operation} is not valid in the {state} state")]
    State {
        operation: &'static str,
        state: &'static str,
    },

    /// A chunk source failed to produce data.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Convenience alias for pipeline results.
pub type EngineResult<T> = Result<T, EngineError>;
