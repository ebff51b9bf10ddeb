//! Fallback provider adapter — OpenRouter-style `/chat/completions` endpoint.
//!
//! Single request mode: the prompt goes out as one user message and the JSON
//! payload comes back inside the reply text, fenced or bare. The adapter
//! holds no credential — the orchestrator passes the key per call, and only
//! after confirming one is configured.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FallbackConfig;
use crate::error::ApiError;
use crate::llm::{GenerationRequest, ProviderResult, classify_http_failure, extract};

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(config: &FallbackConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    /// Issue one chat completion and extract its JSON payload.
    ///
    /// The returned citation list is always empty: the chat-completion
    /// protocol carries no grounding metadata.
    pub async fn complete(
        &self,
        request: &GenerationRequest,
        api_key: &str,
    ) -> Result<ProviderResult, ApiError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message { role: "user", content: &request.prompt }],
        };

        debug!(
            op = request.op.as_str(),
            model = %self.model,
            prompt_len = request.prompt.len(),
            "sending fallback chat completion"
        );

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_http_failure(response).await);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("malformed chat completion envelope: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Parse("empty or missing content in fallback response".into()))?;

        let payload = extract::fenced_or_raw(&text)?;
        Ok(ProviderResult { payload, citations: Vec::new() })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_is_single_user_message() {
        let payload = ChatCompletionRequest {
            model: "google/gemini-flash-1.5",
            messages: vec![Message { role: "user", content: "prompt text" }],
        };
        let wire = serde_json::to_value(&payload).unwrap();
        assert_eq!(wire["model"], "google/gemini-flash-1.5");
        assert_eq!(wire["messages"][0]["role"], "user");
        assert_eq!(wire["messages"][0]["content"], "prompt text");
    }

    #[test]
    fn envelope_reads_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"content":"```json\n{\"ok\":true}\n```"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices.into_iter().next().unwrap().message.content.unwrap();
        assert!(content.contains("ok"));
    }

    #[test]
    fn envelope_tolerates_missing_content() {
        let raw = r#"{"choices":[{"message":{}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
