//! Bounded retry with exponential backoff and jitter.
//!
//! [`run`] is pure retry machinery: it owns no classification rules beyond
//! [`ApiError::is_retryable`] and performs no fallback — quota failures
//! re-raise immediately so the orchestrator sees them on the first attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::ApiError;

/// Retry schedule for one provider call. Fixed per call, not tuned at runtime.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total invocation budget. A value of 0 still attempts once.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: u32,
    /// Upper bound of the random extra wait added to every delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1500),
            backoff_factor: 2,
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps and never re-invokes. Used by tests and by
    /// callers that want fail-fast semantics.
    pub fn single_attempt() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }
}

/// Run `op`, retrying retryable failures up to the policy's attempt budget.
///
/// The request closure is re-invoked unchanged; nothing about the operation
/// mutates between attempts. A cancelled `cancel` token aborts a pending
/// backoff wait with [`ApiError::Cancelled`].
pub async fn run<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() || attempt >= attempts => return Err(err),
            Err(err) => {
                let wait = delay + jitter_within(policy.max_jitter);
                warn!(
                    attempt,
                    max_attempts = attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "retryable provider failure, backing off"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                    _ = tokio::time::sleep(wait) => {}
                }
                delay *= policy.backoff_factor;
            }
        }
    }
}

fn jitter_within(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy { max_attempts, ..RetryPolicy::default() }
    }

    fn counted_failure(
        calls: Arc<AtomicU32>,
        err: fn() -> ApiError,
    ) -> impl FnMut() -> std::future::Ready<Result<(), ApiError>> {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err(err()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_exhausts_attempt_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run(
            &policy(3),
            &CancellationToken::new(),
            counted_failure(calls.clone(), || ApiError::Transport("reset".into())),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn total_delay_follows_backoff_schedule() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let _ = run(
            &policy(3),
            &CancellationToken::new(),
            counted_failure(calls.clone(), || ApiError::Transport("reset".into())),
        )
        .await;
        // Two sleeps: 1500ms and 3000ms, each with up to 500ms jitter.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(4500), "elapsed {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(5500), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn quota_failure_short_circuits_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let result = run(
            &policy(3),
            &CancellationToken::new(),
            counted_failure(calls.clone(), || ApiError::QuotaExhausted("limit".into())),
        )
        .await;
        assert!(matches!(result, Err(ApiError::QuotaExhausted(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn parse_failure_short_circuits_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run(
            &policy(3),
            &CancellationToken::new(),
            counted_failure(calls.clone(), || ApiError::Parse("bad json".into())),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempt_policy_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = run(
            &policy(0),
            &CancellationToken::new(),
            counted_failure(calls.clone(), || ApiError::Transport("reset".into())),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = run(&policy(3), &CancellationToken::new(), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n < 1 {
                Err(ApiError::Transport("reset".into()))
            } else {
                Ok("payload")
            })
        })
        .await;
        assert_eq!(result.unwrap(), "payload");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_pending_backoff() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicU32::new(0));
        let result = run(
            &policy(3),
            &cancel,
            counted_failure(calls.clone(), || ApiError::Transport("reset".into())),
        )
        .await;
        // First attempt runs; the cancelled token then wins the sleep race.
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
