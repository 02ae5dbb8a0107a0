//! SFTP client with managed connection lifecycle
//!
//! One client owns at most one authenticated session. Connecting retries
//! with exponential backoff; authentication failures are fatal and are
//! never retried. Directory and file operations run through
//! [`run_bounded`](super::run_bounded) so a hung call cannot stall an
//! extraction - the session is dropped and rebuilt instead.

use super::bounded::{run_bounded, RetryPolicy};
use super::RemoteFs;
use crate::auth::normalize_private_key;
use crate::config::TapConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Read;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

// libssh2 session error codes that indicate rejected credentials
const LIBSSH2_ERROR_FILE: i32 = -16;
const LIBSSH2_ERROR_AUTHENTICATION_FAILED: i32 = -18;
const LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED: i32 = -19;

// SFTP status codes for missing remote paths
const SSH_FX_NO_SUCH_FILE: i32 = 2;
const SSH_FX_NO_SUCH_PATH: i32 = 10;

// ============================================================================
// Configuration
// ============================================================================

/// Connection parameters and per-operation retry policies
#[derive(Debug, Clone)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Normalized private key material, if key auth is configured
    pub private_key: Option<String>,
    pub password: Option<String>,
    /// Maximum connection attempts before giving up
    pub connect_attempts: u32,
    /// Delay before the first connect retry; doubles each attempt
    pub connect_delay: Duration,
    /// Policy for directory listings
    pub list_policy: RetryPolicy,
    /// Policy for stat calls
    pub stat_policy: RetryPolicy,
    /// Policy for full-file reads
    pub read_policy: RetryPolicy,
    /// Read buffer size for file transfers
    pub read_chunk_size: usize,
}

impl SftpConfig {
    /// Build connection parameters from the tap configuration.
    ///
    /// The private key is normalized here, once, so every (re)connect
    /// uses the same repaired material.
    pub fn from_tap(config: &TapConfig) -> Self {
        Self {
            host: config.sftp_host.clone(),
            port: config.sftp_port,
            username: config.sftp_username.clone(),
            private_key: config
                .sftp_private_key
                .as_deref()
                .map(normalize_private_key),
            password: config.sftp_password.clone(),
            connect_attempts: 5,
            connect_delay: Duration::from_secs(2),
            list_policy: RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(30)),
            stat_policy: RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(15)),
            read_policy: RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(60)),
            read_chunk_size: 32 * 1024,
        }
    }
}

// ============================================================================
// Connection
// ============================================================================

/// A live authenticated session. The `Session` must outlive the `Sftp`
/// channel, so they travel together.
struct Connection {
    _sess: ssh2::Session,
    sftp: ssh2::Sftp,
}

/// Shared handle to a connection. Blocking workers hold a clone; after a
/// forced reconnect an abandoned worker keeps the old handle alive until
/// it returns, while new operations see the fresh one.
type SharedConnection = Arc<StdMutex<Connection>>;

/// Open a TCP connection, handshake, and authenticate. Runs on a
/// blocking worker.
fn open_session(config: &SftpConfig) -> Result<Connection> {
    let addr = format!("{}:{}", config.host, config.port);
    debug!("Opening TCP connection to {addr}");
    let tcp = TcpStream::connect(&addr)?;

    let mut sess = ssh2::Session::new()?;
    sess.set_tcp_stream(tcp);
    sess.handshake()?;

    if let Some(key) = &config.private_key {
        sess.userauth_pubkey_memory(&config.username, None, key, None)
            .map_err(|e| classify_auth_error(e, true))?;
    } else if let Some(password) = &config.password {
        sess.userauth_password(&config.username, password)
            .map_err(|e| classify_auth_error(e, false))?;
    } else {
        return Err(Error::MissingCredentials);
    }

    if !sess.authenticated() {
        return Err(Error::auth("server rejected credentials"));
    }

    let sftp = sess.sftp()?;
    Ok(Connection { _sess: sess, sftp })
}

/// Separate credential rejections (fatal) from transport trouble
/// (retriable).
fn classify_auth_error(e: ssh2::Error, using_key: bool) -> Error {
    match e.code() {
        ssh2::ErrorCode::Session(LIBSSH2_ERROR_AUTHENTICATION_FAILED) => {
            Error::auth(e.message().to_string())
        }
        ssh2::ErrorCode::Session(LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED)
        | ssh2::ErrorCode::Session(LIBSSH2_ERROR_FILE)
            if using_key =>
        {
            Error::invalid_key(e.message().to_string())
        }
        _ => Error::Ssh(e),
    }
}

/// Map an SFTP-level error, turning missing-path status codes into
/// [`Error::NotFound`].
fn map_sftp_error(e: ssh2::Error, path: &Path) -> Error {
    match e.code() {
        ssh2::ErrorCode::SFTP(SSH_FX_NO_SUCH_FILE) | ssh2::ErrorCode::SFTP(SSH_FX_NO_SUCH_PATH) => {
            Error::not_found(path.display().to_string())
        }
        _ => Error::Ssh(e),
    }
}

// ============================================================================
// Client
// ============================================================================

/// SFTP client with lazy connection and bounded, degrading operations
pub struct SftpClient {
    config: SftpConfig,
    conn: Mutex<Option<SharedConnection>>,
}

impl SftpClient {
    pub fn new(config: SftpConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    /// Convenience constructor from the tap configuration
    pub fn from_tap(config: &TapConfig) -> Self {
        Self::new(SftpConfig::from_tap(config))
    }

    /// Establish the session now instead of on first use
    pub async fn connect(&self) -> Result<()> {
        self.ensure_connected().await.map(|_| ())
    }

    /// Close the session. Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        let mut guard = self.conn.lock().await;
        if guard.take().is_some() {
            info!("SFTP session closed");
        }
    }

    /// Return the live connection, establishing it if necessary
    async fn ensure_connected(&self) -> Result<SharedConnection> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.connect_with_retry().await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the (possibly wedged) session and build a fresh one
    async fn force_reconnect(&self) -> Result<()> {
        warn!("Forcing SFTP reconnect");
        self.conn.lock().await.take();
        self.ensure_connected().await.map(|_| ())
    }

    /// Connect with exponential backoff. Authentication failures abort
    /// immediately; everything else is retried up to the attempt limit.
    async fn connect_with_retry(&self) -> Result<SharedConnection> {
        let mut delay = self.config.connect_delay;
        let mut attempt = 0u32;

        loop {
            let config = self.config.clone();
            let outcome = tokio::task::spawn_blocking(move || open_session(&config))
                .await
                .map_err(|e| Error::Other(format!("connect task failed: {e}")))?;
            attempt += 1;

            match outcome {
                Ok(conn) => {
                    info!(
                        "Connected to {}:{} as {}",
                        self.config.host, self.config.port, self.config.username
                    );
                    return Ok(Arc::new(StdMutex::new(conn)));
                }
                Err(e) if e.is_fatal() => {
                    error!("Authentication failed, not retrying: {e}");
                    return Err(e);
                }
                Err(e) => {
                    if attempt >= self.config.connect_attempts {
                        error!("Failed to connect after {attempt} attempts: {e}");
                        return Err(Error::ConnectExhausted {
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    warn!(
                        "Connection attempt {attempt}/{} failed: {e}. Retrying in {delay:?}",
                        self.config.connect_attempts
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// Run a blocking SFTP call on a worker thread against the current
    /// session.
    async fn blocking_op<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ssh2::Sftp) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.ensure_connected().await?;
        tokio::task::spawn_blocking(move || {
            // An abandoned worker may have poisoned the lock on panic;
            // the session is rebuilt on reconnect either way
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&guard.sftp)
        })
        .await
        .map_err(|e| Error::Other(format!("remote operation task failed: {e}")))?
    }

    async fn list_once(&self, path: &str) -> Result<Vec<String>> {
        let path = PathBuf::from(path);
        self.blocking_op(move |sftp| {
            let entries = sftp.readdir(&path).map_err(|e| map_sftp_error(e, &path))?;
            Ok(entries
                .iter()
                .filter_map(|(entry, _stat)| {
                    entry.file_name().map(|n| n.to_string_lossy().into_owned())
                })
                .collect())
        })
        .await
    }

    async fn stat_once(&self, path: &str) -> Result<bool> {
        let path = PathBuf::from(path);
        self.blocking_op(move |sftp| {
            let stat = sftp.stat(&path).map_err(|e| map_sftp_error(e, &path))?;
            Ok(stat.is_dir())
        })
        .await
    }

    async fn read_once(&self, path: &str) -> Result<Vec<u8>> {
        let path = PathBuf::from(path);
        let chunk_size = self.config.read_chunk_size;
        self.blocking_op(move |sftp| {
            let mut file = sftp.open(&path).map_err(|e| map_sftp_error(e, &path))?;
            let mut content = Vec::new();
            let mut buf = vec![0u8; chunk_size];
            let mut chunks = 0u64;
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                content.extend_from_slice(&buf[..n]);
                chunks += 1;
                if chunks % 256 == 0 {
                    debug!("Read {} bytes from {} so far", content.len(), path.display());
                }
            }
            Ok(content)
        })
        .await
    }

}

/// Errors a degraded caller must still see: fatal credential problems,
/// and connect-retry exhaustion.
pub(crate) fn must_propagate(e: &Error) -> bool {
    e.is_fatal() || matches!(e, Error::ConnectExhausted { .. })
}

/// Collapse a failed operation into an empty result, keeping only the
/// errors the caller must see. Missing paths and exhausted retries both
/// degrade, so one unreachable file or folder does not abort a
/// location's extraction.
pub(crate) fn degrade<T: Default>(result: Result<T>, label: &str, path: &str) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(Error::NotFound { .. }) => {
            warn!("{label}: path not found: {path}");
            Ok(T::default())
        }
        Err(e) if must_propagate(&e) => Err(e),
        Err(e) => {
            error!("Giving up on {label} for {path}: {e}");
            Ok(T::default())
        }
    }
}

#[async_trait]
impl RemoteFs for SftpClient {
    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        info!("Listing files in directory: {path}");
        let result = run_bounded(
            &self.config.list_policy,
            "list_dir",
            || self.list_once(path),
            || self.force_reconnect(),
        )
        .await;
        if let Ok(entries) = &result {
            info!("Found {} entries in {path}", entries.len());
        }
        degrade(result, "list_dir", path)
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        let result = run_bounded(
            &self.config.stat_policy,
            "is_directory",
            || self.stat_once(path),
            || self.force_reconnect(),
        )
        .await;
        degrade(result, "is_directory", path)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        info!("Reading file: {path}");
        let result = run_bounded(
            &self.config.read_policy,
            "read_file",
            || self.read_once(path),
            || self.force_reconnect(),
        )
        .await;
        if let Ok(content) = &result {
            info!("Read {} bytes from {path}", content.len());
        }
        degrade(result, "read_file", path)
    }
}
