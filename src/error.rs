//! Error types for curation-validator
//!
//! Engine faults only. Problems with a *submission* (bad layout, missing
//! fields, oversized archive) are never values of [`Error`]; they are reported
//! inside [`crate::types::ValidationOutcome`] as curator-visible errors and
//! warnings. An `Error` here means the engine itself could not complete the
//! call (infrastructure, I/O, reference sources) and should be surfaced to the
//! operator, not the submitter.

use thiserror::Error;

/// Result type alias for curation-validator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for curation-validator
///
/// Each variant describes a fault that aborts a validation call without
/// producing an outcome.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g. "sources.local_tag_file")
        key: Option<String>,
    },

    /// I/O error (scratch directory, bundled file reads, extracted tree walks)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error while fetching a reference source
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON decode error (reference payloads, config files)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The wiki tag page could not be interpreted
    #[error("wiki scrape error: {0}")]
    Scrape(String),

    /// A member-matching pattern failed to compile
    #[error("invalid matching pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A blocking archive task panicked or was cancelled
    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
