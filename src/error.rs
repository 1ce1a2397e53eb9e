//! Error types for MindSync Wellbeing
//!
//! Value-level parse failures are never errors: the normalizer falls back to a
//! documented default instead. These variants cover structural violations and
//! the persistence boundary.

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse vitals payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Vitals record contains no readings")]
    EmptyRecord,

    #[error("Invalid processor state: {0}")]
    StateError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
