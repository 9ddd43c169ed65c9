//! # curation-validator
//!
//! Validation engine for Flashpoint curation submissions.
//!
//! ## Design Philosophy
//!
//! curation-validator is designed to be:
//! - **Curator-facing** - Submission mistakes come back as ordered messages, never as `Err`
//! - **Sensible defaults** - Works against the live reference sources with zero configuration
//! - **Library-first** - No bot or UI, purely a Rust crate for embedding
//! - **Cache-friendly** - Reference data is fetched once per TTL and shared across validations
//!
//! ## Quick Start
//!
//! ```no_run
//! use curation_validator::{Config, CurationValidator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let validator = CurationValidator::new(Config::default());
//!
//!     let outcome = validator.validate("curation.7z").await?;
//!     if outcome.is_accepted() {
//!         println!("curation passed");
//!     }
//!     for error in &outcome.errors {
//!         println!("error: {error}");
//!     }
//!     for warning in &outcome.warnings {
//!         println!("warning: {warning}");
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive reading and scratch extraction
pub mod archive;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Curation layout matching
pub mod layout;
/// Metadata file parsing
pub mod meta;
/// Reference data fetching and caching
pub mod reference;
/// Metadata field rules
pub mod rules;
/// Built-in lookup tables
pub mod tables;
/// Core types
pub mod types;
/// End-to-end validation
pub mod validator;

// Re-export commonly used types
pub use config::{CacheConfig, Config, LimitsConfig, SourcesConfig};
pub use error::{Error, Result};
pub use types::{
    ArchiveFormat, CurationImage, CurationType, ImageKind, PropertyMap, ValidationOutcome,
};
pub use validator::CurationValidator;
