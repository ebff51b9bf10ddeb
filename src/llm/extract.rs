//! JSON extraction from model response text.
//!
//! Grounded responses embed their payload in a markdown code fence; the
//! fallback provider sometimes skips the fence and returns bare JSON. Both
//! conventions are handled here so the adapters share one set of rules.

use serde_json::Value;

use crate::error::ApiError;

/// Locate the body of a fenced JSON block.
///
/// Prefers an explicit ```` ```json ```` fence; otherwise accepts a generic
/// fence whose first body line starts an object. Returns `None` when the
/// text carries no usable fence.
fn fence_body(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let body = &text[start + "```json".len()..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        if let Some(newline) = after.find('\n') {
            let body = &after[newline + 1..];
            if let Some(end) = body.find("```") {
                let candidate = body[..end].trim();
                if candidate.starts_with('{') {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Extract the payload of a grounded response. The fence is mandatory:
/// grounded prompts instruct the model to fence its JSON, so a missing
/// fence means the response did not follow the output contract.
pub fn fenced(text: &str) -> Result<Value, ApiError> {
    let Some(body) = fence_body(text) else {
        return Err(ApiError::Parse("no JSON code fence in grounded response".into()));
    };
    serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("invalid JSON inside code fence: {e}")))
}

/// Extract a payload that may or may not be fenced. Used for the fallback
/// provider, which is not schema-constrained: prefer a fence when present,
/// otherwise try the whole trimmed text as JSON.
pub fn fenced_or_raw(text: &str) -> Result<Value, ApiError> {
    if let Some(body) = fence_body(text) {
        return serde_json::from_str(body)
            .map_err(|e| ApiError::Parse(format!("invalid JSON inside code fence: {e}")));
    }
    serde_json::from_str(text.trim())
        .map_err(|e| ApiError::Parse(format!("response is neither fenced nor raw JSON: {e}")))
}
