//! Provider-facing request/response model shared by both adapters.
//!
//! Adapters translate a [`GenerationRequest`] into their own wire format and
//! hand back a [`ProviderResult`]; everything operation-specific (prompt
//! text, schemas, payload shapes) stays with the caller. Wire types are
//! private to each adapter module.

pub mod extract;
pub mod gemini;
pub mod openrouter;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Which logical operation a request serves. Carried for diagnostics only —
/// adapters treat every operation identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    AnalyzeTopic,
    DiscoverMore,
    UpcomingMeetings,
    DailyBriefing,
    EventTimeline,
    RelatedTopics,
    TrendingTopics,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::AnalyzeTopic => "analyze_topic",
            OpKind::DiscoverMore => "discover_more",
            OpKind::UpcomingMeetings => "upcoming_meetings",
            OpKind::DailyBriefing => "daily_briefing",
            OpKind::EventTimeline => "event_timeline",
            OpKind::RelatedTopics => "related_topics",
            OpKind::TrendingTopics => "trending_topics",
        }
    }
}

/// One generation request. Constructed fresh per call and never mutated —
/// the retry executor resubmits it unchanged.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub op: OpKind,
    pub prompt: String,
    /// `Some` selects schema mode on the primary provider (the response text
    /// is guaranteed JSON conforming to this descriptor); `None` selects
    /// grounded search mode with the JSON-in-fence convention.
    pub schema: Option<Value>,
}

/// One grounding citation from the primary provider's search metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingCitation {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Parsed provider output before operation-specific shaping.
///
/// Invariant: `citations` is always empty for fallback responses — only the
/// primary provider's grounded mode produces them.
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub payload: Value,
    pub citations: Vec<GroundingCitation>,
}

// Error envelope shared by both providers' non-2xx bodies. The primary also
// carries a `status` code string; the fallback may carry a numeric `code`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Map a non-success provider response onto the failure taxonomy.
///
/// Both adapters route HTTP errors through here so quota classification
/// cannot drift between them: 429 is always quota, and an error body whose
/// `status` is `RESOURCE_EXHAUSTED` counts as quota regardless of the HTTP
/// status. Anything else becomes [`ApiError::Provider`] with the body's
/// message when one is readable.
pub(crate) async fn classify_http_failure(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    classify_failure_body(status, &body)
}

fn classify_failure_body(status: u16, body: &str) -> ApiError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope.as_ref().and_then(|e| e.error.message.clone());
    let exhausted = envelope
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED");

    if status == 429 || exhausted {
        return ApiError::QuotaExhausted(
            message.unwrap_or_else(|| "provider rate limit hit".to_string()),
        );
    }
    ApiError::Provider {
        status,
        message: message.unwrap_or_else(|| format!("request failed with status {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_quota_regardless_of_body() {
        let err = classify_failure_body(429, "plain text overload notice");
        assert!(err.is_quota());
    }

    #[test]
    fn resource_exhausted_body_is_quota_even_on_other_status() {
        let body = r#"{"error":{"code":403,"message":"Daily limit reached","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_failure_body(403, body);
        assert!(err.is_quota());
        assert!(err.to_string().contains("Daily limit reached"));
    }

    #[test]
    fn structured_message_is_surfaced() {
        let body = r#"{"error":{"message":"model not found","code":404}}"#;
        match classify_failure_body(404, body) {
            ApiError::Provider { status: 404, message } => {
                assert_eq!(message, "model not found");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unreadable_body_falls_back_to_status_message() {
        match classify_failure_body(500, "<html>oops</html>") {
            ApiError::Provider { status: 500, message } => {
                assert_eq!(message, "request failed with status 500");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
