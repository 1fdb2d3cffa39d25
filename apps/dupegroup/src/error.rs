//! # Application Errors
//!
//! Engine errors plus the failures only the binary can hit: reading
//! files and parsing import records.

use dupegroup_core::DedupeError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Raised by the engine or a store.
    #[error(transparent)]
    Engine(#[from] DedupeError),

    /// A file could not be read, written, or removed.
    #[error("I/O error: {0}")]
    Io(String),

    /// An import record could not be parsed.
    #[error("Invalid import record at {location}: {message}")]
    Input {
        /// Where the record sits, e.g. "line 3" or "record 2".
        location: String,
        /// Parser message.
        message: String,
    },
}
