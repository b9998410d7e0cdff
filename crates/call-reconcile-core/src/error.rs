//! Error kinds raised (or recovered from) by the reconciliation pipeline.
//!
//! Most of these are non-fatal: transforms degrade gracefully and surface
//! the condition in a report struct instead of returning `Err`. Only
//! [`ReconcileError::ManifestNotFound`] and [`ReconcileError::Store`]
//! abort an operation.

use thiserror::Error;

/// Result alias for fallible core operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// A required column is absent from an input table.
    #[error("missing column '{column}' in {table} table")]
    MissingColumn { table: String, column: String },

    /// Analysis was requested against a job the store does not know.
    #[error("manifest not found for job '{0}'")]
    ManifestNotFound(String),

    /// More than one rowmap entry matched a single call record.
    #[error("ambiguous match for '{key}': {candidates} candidates")]
    AmbiguousMatch { key: String, candidates: usize },

    /// A duration token could not be parsed.
    #[error("malformed duration '{0}'")]
    DurationParse(String),

    /// Job store backend failure.
    #[error("job store error: {0}")]
    Store(String),
}
