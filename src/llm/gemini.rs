//! Primary provider adapter — Google-style `generateContent` endpoint.
//!
//! Two request modes, selected by the request's `schema` field:
//!
//! * **Schema mode** — the response text is guaranteed to be JSON conforming
//!   to the supplied descriptor; it is parsed directly and a failure there is
//!   a contract violation, not a recoverable condition.
//! * **Grounded mode** — a web-search tool is enabled and the prompt asks for
//!   a fenced JSON payload; grounding citations are read from the response
//!   metadata.
//!
//! All wire types are private to this module.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::PrimaryConfig;
use crate::error::ApiError;
use crate::llm::{GenerationRequest, GroundingCitation, ProviderResult, classify_http_failure, extract};

/// Adapter for the primary generation endpoint.
///
/// Constructed once and cloned freely — `reqwest::Client` is an `Arc`
/// internally. Stateless per invocation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &PrimaryConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Issue one generation request and return its parsed payload plus any
    /// grounding citations.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<ProviderResult, ApiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest::for_request(request);

        debug!(
            op = request.op.as_str(),
            mode = if request.schema.is_some() { "schema" } else { "grounded" },
            prompt_len = request.prompt.len(),
            "sending primary generation request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_http_failure(response).await);
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("malformed generation envelope: {e}")))?;

        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string(&envelope)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(response = %json, "full primary response envelope");
        }

        let citations = envelope.citations();
        let text = envelope
            .text()
            .ok_or_else(|| ApiError::Parse("empty candidate content in primary response".into()))?;

        let payload = match request.schema {
            // Schema mode guarantees conforming JSON; anything else means the
            // schema contract was violated.
            Some(_) => serde_json::from_str(&text)
                .map_err(|e| ApiError::Parse(format!("schema-mode response is not valid JSON: {e}")))?,
            None => extract::fenced(&text)?,
        };

        debug!(op = request.op.as_str(), citations = citations.len(), "primary response parsed");
        Ok(ProviderResult { payload, citations })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn for_request(request: &'a GenerationRequest) -> Self {
        let contents = vec![Content { parts: vec![Part { text: &request.prompt }] }];
        match &request.schema {
            Some(schema) => Self {
                contents,
                generation_config: Some(GenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: schema,
                }),
                tools: None,
            },
            None => Self {
                contents,
                generation_config: None,
                tools: Some(vec![Tool { google_search: GoogleSearch {} }]),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let parts = &candidate.content.as_ref()?.parts;
        let joined: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!joined.trim().is_empty()).then_some(joined)
    }

    fn citations(&self) -> Vec<GroundingCitation> {
        let Some(candidate) = self.candidates.first() else {
            return Vec::new();
        };
        candidate
            .grounding_metadata
            .iter()
            .flat_map(|m| &m.grounding_chunks)
            .filter_map(|chunk| chunk.web.as_ref())
            .map(|web| GroundingCitation { uri: web.uri.clone(), title: web.title.clone() })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(rename = "groundingMetadata", default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}
