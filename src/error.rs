//! Application-wide error types.
//!
//! [`ApiError`] is the closed set of failure kinds the request pipeline can
//! produce. Control flow (retry eligibility, fallback eligibility) is decided
//! by matching on the variant, never by inspecting message text.

use thiserror::Error;

/// Failure kinds for provider calls and their orchestration.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side construction or configuration problem.
    #[error("config error: {0}")]
    Config(String),

    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-quota HTTP error reported by a provider.
    #[error("provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    /// The provider's usage limit was hit. Triggers fallback, never retried.
    #[error("provider quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Primary quota exhausted with no fallback credential configured.
    /// Distinct from [`ApiError::QuotaExhausted`] so callers can prompt for a
    /// key instead of showing a dead-end error.
    #[error("primary quota exhausted and no fallback API key is configured")]
    FallbackUnconfigured,

    /// The response could not be turned into the expected JSON payload.
    #[error("response parse error: {0}")]
    Parse(String),

    /// The caller cancelled the operation while a backoff wait was pending.
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Quota failures are the only kind eligible for provider fallback.
    pub fn is_quota(&self) -> bool {
        matches!(self, ApiError::QuotaExhausted(_))
    }

    /// Whether the backoff executor may retry this failure.
    ///
    /// Transport hiccups and 5xx responses are transient. Everything else is
    /// deterministic for an unchanged request: quota needs fallback, parse
    /// failures reproduce, 4xx responses reject the request itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Provider { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Errors outside the request pipeline: startup, config files, logging.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
