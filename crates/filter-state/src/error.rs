//! Error types for the filter-state crate.
//!
//! Filtering itself never fails. These errors only come from the
//! parsing helpers that turn user input into a `FilterValues` mapping.

use thiserror::Error;

/// Errors raised while building a selection mapping from text.
#[derive(Error, Debug)]
pub enum FilterError {
    /// A `key=value` pair had no `=` separator
    #[error("Invalid selection '{0}': expected key=value")]
    InvalidSelection(String),

    /// The key part of a `key=value` pair was empty
    #[error("Invalid selection '{0}': key must not be empty")]
    EmptyKey(String),

    /// The selection JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FilterError>;
