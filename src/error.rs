//! Error types for the datebook core.

use thiserror::Error;

/// Errors that can occur in datebook operations.
///
/// All three variants are recoverable: the store and the storage adapter
/// surface them as return values, never as panics. A `Storage` error after a
/// mutation means the in-memory state is ahead of what was persisted, not
/// that the mutation was lost.
#[derive(Error, Debug)]
pub enum DatebookError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for datebook operations.
pub type DatebookResult<T> = Result<T, DatebookError>;
