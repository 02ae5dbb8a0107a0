// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # dropsync
//!
//! Extracts tabular and nested-JSON business records from dated drop
//! folders on a remote SFTP server and emits them as flat, uniquely-keyed
//! records for downstream ingestion.
//!
//! ## Features
//!
//! - **Resilient remote access**: one authenticated session, bounded
//!   operations with per-call deadlines, forced reconnect on hang
//! - **Latest-folder resolution**: picks the most recent `YYYYMMDD`
//!   drop folder without statting every entry
//! - **Format decoders**: CSV, spreadsheet, and JSON with shared
//!   field-name canonicalization
//! - **Hierarchical flattening**: one flat record stream per tree depth,
//!   with ancestor keys stamped and missing keys synthesized
//! - **Run-scoped caches**: file content and materialized record sets
//!   are fetched/extracted at most once per run
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ExtractEngine                            │
//! │  locations → latest folder → files → decode → flatten → emit    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   SFTP    │    Decode     │  Flatten  │   Caches    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Key fix  │ Connect   │ CSV           │ Levels    │ Content     │
//! │ Key kind │ Bounded   │ Spreadsheet   │ Ancestors │ Records     │
//! │ Password │ Reconnect │ JSON          │ Key synth │ Fingerprint │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and classification
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// Private key normalization
pub mod auth;

/// SFTP connection management and bounded operations
pub mod sftp;

/// Content and record caches
pub mod cache;

/// Latest date-folder resolution
pub mod folders;

/// File format decoders
pub mod decode;

/// Hierarchical record flattening
pub mod flatten;

/// Built-in stream descriptors
pub mod catalog;

/// Extraction engine
pub mod engine;

/// Wildcard filename matching
pub mod pattern;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorClass, Result};
pub use types::*;

pub use catalog::{builtin_streams, SourceKind, StreamDescriptor};
pub use engine::ExtractEngine;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
