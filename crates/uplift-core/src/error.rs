//! Error taxonomy for batch orchestration.
//!
//! `BatchError` covers API misuse and is returned by coordinator methods.
//! `TransportError` is the per-item upload failure: it is captured and
//! folded into the batch outcome, never propagated out of a run.

use thiserror::Error;

/// Batch lifecycle / API misuse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// Operation called in the wrong lifecycle phase (e.g. mutating the
    /// selection while a run is in progress, or starting a batch twice).
    #[error("Invalid batch state: {0}")]
    InvalidState(&'static str),

    /// `start` called with no items selected.
    #[error("Batch is empty: select at least one file")]
    EmptyBatch,

    /// Removal index past the end of the selection.
    #[error("Index {index} out of range for selection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for coordinator operations
pub type BatchResult<T> = Result<T, BatchError>;

/// A single upload attempt failure.
///
/// Expected at runtime and recoverable at the batch level: one failed item
/// never stops the remaining items from being attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upload rejected with status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Upload timed out")]
    Timeout,

    #[error("Failed to decode upload response: {0}")]
    Decode(String),
}
