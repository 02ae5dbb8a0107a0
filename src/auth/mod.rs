//! Private key normalization
//!
//! SSH keys are often stored and copied with missing or incorrect
//! newlines (environment variables, JSON config files, copy/paste).
//! This module repairs such key material into a canonical multi-line
//! form before it is handed to the transport layer.

mod key;

pub use key::{normalize_private_key, KeyKind};

#[cfg(test)]
mod tests;
