//! Deadline and retry wrapper for remote operations

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

// ============================================================================
// Retry Policy
// ============================================================================

/// Deadline and retry parameters for one class of remote operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_delay: Duration,
    /// Per-attempt deadline
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            timeout,
        }
    }
}

// ============================================================================
// Bounded Execution
// ============================================================================

/// Run a remote operation under the policy's deadline, retrying with
/// exponential backoff.
///
/// Two failure shapes are handled differently:
/// - The operation returns a retryable error: back off and try again.
/// - The per-attempt deadline elapses: the blocking worker may be hung
///   on a dead socket, so `recover` is invoked (forced reconnect) before
///   the next attempt. The abandoned worker still holds the old session
///   handle and finishes or fails on its own.
///
/// Non-retryable errors (missing paths, bad credentials) and `recover`
/// failures are returned immediately. When all attempts are exhausted
/// the last error is returned; callers decide whether to degrade.
pub async fn run_bounded<T, Op, OpFut, Rec, RecFut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: Op,
    mut recover: Rec,
) -> Result<T>
where
    Op: FnMut() -> OpFut,
    OpFut: Future<Output = Result<T>>,
    Rec: FnMut() -> RecFut,
    RecFut: Future<Output = Result<()>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0u32;

    loop {
        let outcome = tokio::time::timeout(policy.timeout, op()).await;
        attempt += 1;

        let err = match outcome {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) if !e.is_retryable() => return Err(e),
            Ok(Err(e)) => e,
            Err(_elapsed) => {
                warn!(
                    "{label} timed out after {:?} (attempt {attempt}/{})",
                    policy.timeout, policy.max_attempts
                );
                // The session may be wedged; reclaim it before retrying
                recover().await?;
                Error::Timeout {
                    timeout_ms: policy.timeout.as_millis() as u64,
                }
            }
        };

        if attempt >= policy.max_attempts {
            error!("{label} failed after {attempt} attempts: {err}");
            return Err(err);
        }

        warn!("{label} attempt {attempt} failed: {err}. Retrying in {delay:?}");
        tokio::time::sleep(delay).await;
        delay *= 2;
    }
}
