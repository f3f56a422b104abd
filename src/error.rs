//! Error types for the highlighter.
//!
//! Validation failures are raised before any output is written. I/O and
//! payload failures abort a call midway; whatever was already written to the
//! sink should be treated as unusable.

use thiserror::Error;

/// Errors that can occur while highlighting a document.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// Reading the source or writing the sink failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// An interval whose end precedes its start.
    #[error("malformed interval #{index}: end {end} precedes start {start}")]
    MalformedInterval {
        index: usize,
        start: usize,
        end: usize,
    },

    /// The info payload of an interval could not be serialized.
    #[error("failed to serialize info payload (identifier: {identifier:?}): {source}")]
    Payload {
        identifier: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration is unusable.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

/// Result type for highlight operations.
pub type HighlightResult<T> = Result<T, HighlightError>;
