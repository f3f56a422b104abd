//! Error types for the fixture harness.
//!
//! This module defines error types for fixture parsing, fixture loading
//! and rendering failures.

use layered_highlight::HighlightError;
use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Error parsing a fixture file.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Error loading a fixture file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// The highlighter itself failed on a fixture.
    #[error("highlight failed: {0}")]
    Highlight(#[from] HighlightError),
}

/// Result type for harness operations.
pub type SpecResult<T> = Result<T, SpecError>;
