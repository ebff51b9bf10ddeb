//! Try-primary-then-fallback orchestration.
//!
//! One state machine shared by every operation:
//!
//! ```text
//! START -> TRY_PRIMARY
//! TRY_PRIMARY --success--> DONE(used_fallback=false)
//! TRY_PRIMARY --quota & fallback key present--> TRY_SECONDARY
//! TRY_PRIMARY --quota & fallback key absent--> FAIL(FallbackUnconfigured)
//! TRY_PRIMARY --other failure--> FAIL(propagate as-is)
//! TRY_SECONDARY --success--> DONE(used_fallback=true)
//! TRY_SECONDARY --any failure--> FAIL(propagate as-is)
//! ```
//!
//! Retries live in [`crate::retry`], wrapped around each adapter call by the
//! caller; this function never retries anything itself.

use std::future::Future;

use tracing::{info, warn};

use crate::error::ApiError;

/// A successful operation's payload plus how it was served.
///
/// `used_fallback` is observability only — it never changes the payload
/// shape, and callers use it to tell the user the secondary key kicked in.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome<T> {
    pub data: T,
    pub used_fallback: bool,
}

impl<T> OperationOutcome<T> {
    /// Transform the payload, keeping the fallback flag.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<OperationOutcome<U>, E> {
        Ok(OperationOutcome { data: f(self.data)?, used_fallback: self.used_fallback })
    }
}

/// Run `primary`, switching to `secondary` only on quota exhaustion and only
/// when a fallback credential is configured.
///
/// `secondary` receives the credential; it is never invoked without one.
/// Non-quota failures propagate unchanged in kind from whichever provider
/// raised them.
pub async fn with_fallback<T, P, PFut, S, SFut>(
    op_name: &str,
    fallback_api_key: Option<&str>,
    primary: P,
    secondary: S,
) -> Result<OperationOutcome<T>, ApiError>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<T, ApiError>>,
    S: FnOnce(String) -> SFut,
    SFut: Future<Output = Result<T, ApiError>>,
{
    match primary().await {
        Ok(data) => Ok(OperationOutcome { data, used_fallback: false }),
        Err(err) if err.is_quota() => {
            let Some(key) = fallback_api_key else {
                warn!(op = op_name, "primary quota exhausted, no fallback key configured");
                return Err(ApiError::FallbackUnconfigured);
            };
            info!(op = op_name, %err, "primary quota exhausted, switching to fallback provider");
            let data = secondary(key.to_string()).await?;
            Ok(OperationOutcome { data, used_fallback: true })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quota() -> ApiError {
        ApiError::QuotaExhausted("limit".into())
    }

    #[tokio::test]
    async fn primary_success_never_touches_secondary() {
        let secondary_calls = Arc::new(AtomicU32::new(0));
        let counter = secondary_calls.clone();
        let outcome = with_fallback(
            "test",
            Some("fb-key"),
            || async { Ok(41) },
            |_key| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(0) }
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.data, 41);
        assert!(!outcome.used_fallback);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn quota_with_key_runs_secondary_once() {
        let secondary_calls = Arc::new(AtomicU32::new(0));
        let counter = secondary_calls.clone();
        let outcome = with_fallback(
            "test",
            Some("fb-key"),
            || async { Err::<i32, _>(quota()) },
            |key| {
                counter.fetch_add(1, Ordering::SeqCst);
                assert_eq!(key, "fb-key");
                async { Ok(7) }
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.data, 7);
        assert!(outcome.used_fallback);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn quota_without_key_is_needs_configuration() {
        let result = with_fallback(
            "test",
            None,
            || async { Err::<i32, _>(quota()) },
            |_key| async { panic!("secondary must not run without a key") },
        )
        .await;
        assert!(matches!(result, Err(ApiError::FallbackUnconfigured)));
    }

    #[tokio::test]
    async fn non_quota_failure_propagates_without_fallback() {
        let result = with_fallback(
            "test",
            Some("fb-key"),
            || async { Err::<i32, _>(ApiError::Parse("bad json".into())) },
            |_key| async { panic!("secondary must not run on non-quota failures") },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn secondary_failure_propagates_as_is() {
        let result = with_fallback(
            "test",
            Some("fb-key"),
            || async { Err::<i32, _>(quota()) },
            |_key| async { Err(ApiError::Provider { status: 401, message: "bad key".into() }) },
        )
        .await;
        assert!(matches!(result, Err(ApiError::Provider { status: 401, .. })));
    }
}
