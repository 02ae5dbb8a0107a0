//! Tests for bounded execution and the in-memory remote

use super::client::degrade;
use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(30))
}

fn no_recover() -> impl FnMut() -> std::future::Ready<crate::error::Result<()>> {
    || std::future::ready(Ok(()))
}

#[tokio::test(start_paused = true)]
async fn test_bounded_success_first_attempt() {
    let result = run_bounded(&policy(), "op", || async { Ok(7u32) }, no_recover()).await;
    assert_eq!(result.unwrap(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_recovers_after_timeouts() {
    let calls = Arc::new(AtomicU32::new(0));
    let recoveries = Arc::new(AtomicU32::new(0));

    let op_calls = calls.clone();
    let rec_count = recoveries.clone();
    let result = run_bounded(
        &policy(),
        "op",
        move || {
            let calls = op_calls.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    // Simulate a hung remote call; the deadline fires first
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
                Ok(b"payload".to_vec())
            }
        },
        move || {
            rec_count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(()))
        },
    )
    .await;

    assert_eq!(result.unwrap(), b"payload");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Each timed-out attempt forces a reconnect
    assert_eq!(recoveries.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_exhausts_attempts_on_persistent_hang() {
    let recoveries = Arc::new(AtomicU32::new(0));
    let rec_count = recoveries.clone();

    let result: crate::error::Result<Vec<u8>> = run_bounded(
        &policy(),
        "op",
        || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        },
        move || {
            rec_count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(()))
        },
    )
    .await;

    assert!(matches!(result, Err(Error::Timeout { .. })));
    assert_eq!(recoveries.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_not_found_returned_without_retry() {
    let calls = Arc::new(AtomicU32::new(0));
    let op_calls = calls.clone();

    let result: crate::error::Result<Vec<u8>> = run_bounded(
        &policy(),
        "op",
        move || {
            let calls = op_calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::not_found("/missing"))
            }
        },
        no_recover(),
    )
    .await;

    assert!(matches!(result, Err(Error::NotFound { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bounded_fatal_error_not_retried() {
    let result: crate::error::Result<()> = run_bounded(
        &policy(),
        "op",
        || async { Err(Error::auth("bad key")) },
        no_recover(),
    )
    .await;
    assert!(matches!(result, Err(Error::Auth { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_bounded_retries_transient_errors() {
    let calls = Arc::new(AtomicU32::new(0));
    let op_calls = calls.clone();

    let result = run_bounded(
        &policy(),
        "op",
        move || {
            let calls = op_calls.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 2 {
                    Err(Error::Timeout { timeout_ms: 100 })
                } else {
                    Ok("listing")
                }
            }
        },
        no_recover(),
    )
    .await;

    assert_eq!(result.unwrap(), "listing");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Degraded results
// ============================================================================

#[test]
fn test_degrade_collapses_exhausted_retries_to_empty() {
    // A read that never succeeded within its attempts yields empty
    // bytes, not an error
    let read: crate::error::Result<Vec<u8>> = degrade(
        Err(Error::Timeout { timeout_ms: 60_000 }),
        "read_file",
        "/123456/20250601/OrderDetails.csv",
    );
    assert_eq!(read.unwrap(), Vec::<u8>::new());

    let stat: crate::error::Result<bool> = degrade(
        Err(Error::Timeout { timeout_ms: 15_000 }),
        "is_directory",
        "/123456/20250601",
    );
    assert!(!stat.unwrap());

    let list: crate::error::Result<Vec<String>> =
        degrade(Err(Error::not_found("/123456")), "list_dir", "/123456");
    assert!(list.unwrap().is_empty());
}

#[test]
fn test_degrade_propagates_fatal_and_connect_exhaustion() {
    let read: crate::error::Result<Vec<u8>> =
        degrade(Err(Error::auth("rejected by server")), "read_file", "/p");
    assert!(matches!(read, Err(Error::Auth { .. })));

    let read: crate::error::Result<Vec<u8>> = degrade(
        Err(Error::ConnectExhausted {
            attempts: 5,
            message: "unreachable".to_string(),
        }),
        "read_file",
        "/p",
    );
    assert!(matches!(read, Err(Error::ConnectExhausted { .. })));

    // Successful results pass through untouched
    let list: crate::error::Result<Vec<String>> =
        degrade(Ok(vec!["20250601".to_string()]), "list_dir", "/123456");
    assert_eq!(list.unwrap(), vec!["20250601"]);
}

// ============================================================================
// MemoryFs
// ============================================================================

#[tokio::test]
async fn test_memory_fs_listing_and_reads() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/OrderDetails.csv", "a,b\n1,2\n");
    fs.add_file("/123456/20250601/PaymentDetails.csv", "x\n");
    fs.add_dir("/123456/20250602");

    let mut dates = fs.list_dir("/123456").await.unwrap();
    dates.sort();
    assert_eq!(dates, vec!["20250601", "20250602"]);

    assert!(fs.is_directory("/123456/20250601").await.unwrap());
    assert!(!fs.is_directory("/123456/20250603").await.unwrap());

    let content = fs.read_file("/123456/20250601/OrderDetails.csv").await.unwrap();
    assert_eq!(content, b"a,b\n1,2\n");
    assert_eq!(fs.read_count("/123456/20250601/OrderDetails.csv"), 1);

    // Missing files degrade to empty content, mirroring the real client
    let missing = fs.read_file("/123456/20250601/Nope.csv").await.unwrap();
    assert!(missing.is_empty());
}
