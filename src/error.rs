//! Error types for dropsync
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into three classes (see [`ErrorClass`]):
//! - **Fatal**: broken credentials or key material; never retried, the
//!   run must stop.
//! - **Retriable**: transient network/protocol trouble; the caller may
//!   try again later.
//! - **Soft**: a single file, folder, or record could not be processed;
//!   extraction continues with the next one.

use thiserror::Error;

/// The main error type for dropsync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Either a private key or a password must be configured")]
    MissingCredentials,

    // ============================================================================
    // Authentication Errors (fatal)
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Invalid private key format: {message}")]
    InvalidKey { message: String },

    // ============================================================================
    // Transport Errors (retriable)
    // ============================================================================
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to connect after {attempts} attempts: {message}")]
    ConnectExhausted { attempts: u32, message: String },

    #[error("Remote path not found: {path}")]
    NotFound { path: String },

    // ============================================================================
    // Data Processing Errors (soft)
    // ============================================================================
    #[error("Failed to decode file: {message}")]
    Decode { message: String },

    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    #[error("Spreadsheet error: {message}")]
    Spreadsheet { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Error class, driving retry/skip/abort decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Never retried; the run must stop
    Fatal,
    /// Transient; the caller may retry with backoff
    Retriable,
    /// One file/folder/record failed; skip it and continue
    Soft,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an invalid-key error
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a spreadsheet error
    pub fn spreadsheet(message: impl Into<String>) -> Self {
        Self::Spreadsheet {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Auth { .. }
            | Error::InvalidKey { .. }
            | Error::MissingCredentials
            | Error::Config { .. }
            | Error::MissingConfigField { .. } => ErrorClass::Fatal,
            Error::Ssh(_)
            | Error::Timeout { .. }
            | Error::ConnectExhausted { .. }
            | Error::Io(_) => ErrorClass::Retriable,
            _ => ErrorClass::Soft,
        }
    }

    /// Check if this error must stop the run
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }

    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Retriable
    }
}

/// Result type alias for dropsync
pub type Result<T> = std::result::Result<T, Error>;
