//! Deadline wrapper for adapter calls.
//!
//! Adapter futures have no intrinsic timeout; a backend that never answers
//! would otherwise leave a picker busy forever. Every adapter call made by
//! the engine goes through [`with_deadline`].

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::timeout;

/// Raised when a bounded operation does not finish in time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} timed out after {timeout_ms}ms")]
pub struct DeadlineError {
    pub operation: String,
    pub timeout_ms: u64,
}

/// Run `future` to completion, failing once `limit` elapses.
///
/// # Arguments
/// - `operation`: Name used in the error when the deadline is exceeded.
/// - `limit`: Maximum wait; `None` awaits the future without a bound.
/// - `future`: The operation to run.
///
/// # Returns
/// The future's output, or a [`DeadlineError`] when the deadline passes first.
/// The inner future is dropped on timeout.
pub async fn with_deadline<F, T>(operation: &str, limit: Option<Duration>, future: F) -> Result<T, DeadlineError>
where
    F: Future<Output = T>,
{
    let Some(limit) = limit else {
        return Ok(future.await);
    };

    timeout(limit, future).await.map_err(|_| DeadlineError {
        operation: operation.to_string(),
        timeout_ms: limit.as_millis().try_into().unwrap_or(u64::MAX),
    })
}
