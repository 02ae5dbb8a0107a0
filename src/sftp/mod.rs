//! SFTP connection management and bounded operations
//!
//! Provides:
//! - `SftpClient` - one authenticated session with connect/disconnect
//!   retry and backoff
//! - `run_bounded` - remote operations under a deadline, with forced
//!   reconnection when a call hangs
//! - `RemoteFs` - the trait seam the extraction engine works against
//! - `MemoryFs` - an in-memory remote for tests
//!
//! All libssh2 calls are blocking; they run on `spawn_blocking` workers
//! so a deadline can be enforced from the async side. Cancellation of a
//! timed-out call is best-effort (the worker is abandoned, not stopped);
//! the forced reconnect is what actually reclaims the session.

mod bounded;
mod client;
mod memory;

pub use bounded::{run_bounded, RetryPolicy};
pub use client::{SftpClient, SftpConfig};
pub use memory::MemoryFs;

use crate::error::Result;
use async_trait::async_trait;

/// Remote filesystem operations, already degraded per the retry policy.
///
/// Implementations return `Err` only for errors the caller must see:
/// broken credentials, or connect-retry exhaustion. Missing paths and
/// exhausted operation retries degrade to an empty/false result, so one
/// unreachable file does not abort a location's extraction.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// List entry names directly under `path`
    async fn list_dir(&self, path: &str) -> Result<Vec<String>>;

    /// Check whether `path` exists and is a directory
    async fn is_directory(&self, path: &str) -> Result<bool>;

    /// Read the full content of the file at `path`
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests;
