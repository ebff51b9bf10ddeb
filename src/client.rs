//! The public client: seven operations over two providers.
//!
//! Every operation goes through the same path: build a prompt (plus a
//! response schema for schema-mode calls), dispatch through the fallback
//! orchestrator with the retry executor wrapping each adapter, then decode
//! and normalize the payload. Operations differ only in those three inputs.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::ApiError;
use crate::llm::gemini::GeminiClient;
use crate::llm::openrouter::OpenRouterClient;
use crate::llm::{GenerationRequest, OpKind, ProviderResult};
use crate::ops::{self, prompts, schemas};
use crate::orchestrator::{self, OperationOutcome};
use crate::retry::{self, RetryPolicy};
use crate::types::{Article, Briefing, Meeting, TimelineEvent, Topic, TopicReport};
use crate::normalize;

/// Client for the intelligence-generation operations.
///
/// Holds both provider adapters, the fallback credential (if any), the retry
/// policy, and a cancellation token. Cheap to clone; adapters are stateless
/// per invocation, so concurrent operations on clones are safe.
#[derive(Debug, Clone)]
pub struct Client {
    primary: GeminiClient,
    secondary: OpenRouterClient,
    fallback_api_key: Option<String>,
    retry_policy: RetryPolicy,
    cancel: CancellationToken,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self {
            primary: GeminiClient::new(&config.primary)?,
            secondary: OpenRouterClient::new(&config.fallback)?,
            fallback_api_key: config.fallback_api_key.clone(),
            retry_policy: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the default retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Token aborting in-flight backoff waits. Clone it and call `cancel()`
    /// from another task; pending operations fail with [`ApiError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Investigate a topic from scratch: articles, knowledge graph, citations.
    pub async fn analyze_topic(
        &self,
        topic_name: &str,
        query: &str,
    ) -> Result<OperationOutcome<TopicReport>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::AnalyzeTopic,
            prompt: prompts::analyze_topic(topic_name, query, &today()),
            schema: None,
        };
        self.dispatch(&request).await?.try_map(ops::topic_report)
    }

    /// Continue an investigation: fetch new articles and merge them into the
    /// existing report (existing URLs win, graph deduped).
    pub async fn discover_more(
        &self,
        query: &str,
        existing: &TopicReport,
    ) -> Result<OperationOutcome<TopicReport>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::DiscoverMore,
            prompt: prompts::discover_more(query, &existing.articles, &today()),
            schema: None,
        };
        self.dispatch(&request).await?.try_map(|result| {
            Ok(normalize::merge_reports(existing, ops::topic_report(result)?))
        })
    }

    /// Upcoming high-level international meetings, sorted by date with
    /// derived ids.
    pub async fn upcoming_meetings(&self) -> Result<OperationOutcome<Vec<Meeting>>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::UpcomingMeetings,
            prompt: prompts::upcoming_meetings(&today()),
            schema: None,
        };
        self.dispatch(&request).await?.try_map(ops::meetings)
    }

    /// Synthesize a bilingual briefing from analyzed articles.
    pub async fn daily_briefing(
        &self,
        articles: &[Article],
    ) -> Result<OperationOutcome<Briefing>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::DailyBriefing,
            prompt: prompts::daily_briefing(articles),
            schema: Some(schemas::briefing()),
        };
        self.dispatch(&request).await?.try_map(ops::briefing)
    }

    /// Extract a chronological event timeline from analyzed articles.
    pub async fn event_timeline(
        &self,
        articles: &[Article],
    ) -> Result<OperationOutcome<Vec<TimelineEvent>>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::EventTimeline,
            prompt: prompts::event_timeline(articles),
            schema: Some(schemas::timeline()),
        };
        self.dispatch(&request).await?.try_map(ops::timeline)
    }

    /// Suggest topics related to the ones already monitored. Suggestions
    /// matching an existing topic name are dropped.
    pub async fn related_topic_suggestions(
        &self,
        existing: &[Topic],
    ) -> Result<OperationOutcome<Vec<String>>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::RelatedTopics,
            prompt: prompts::related_topics(existing),
            schema: Some(schemas::suggestions()),
        };
        self.dispatch(&request).await?.try_map(|result| {
            Ok(normalize::filter_suggestions(ops::suggestions(result)?, existing))
        })
    }

    /// Suggest currently trending topics via web search, filtered the same
    /// way as related suggestions.
    pub async fn trending_topic_suggestions(
        &self,
        existing: &[Topic],
    ) -> Result<OperationOutcome<Vec<String>>, ApiError> {
        let request = GenerationRequest {
            op: OpKind::TrendingTopics,
            prompt: prompts::trending_topics(&today()),
            schema: None,
        };
        self.dispatch(&request).await?.try_map(|result| {
            Ok(normalize::filter_suggestions(ops::suggestions(result)?, existing))
        })
    }

    /// One request through retry and fallback. The secondary adapter only
    /// runs on primary quota exhaustion, and only with a configured key.
    async fn dispatch(
        &self,
        request: &GenerationRequest,
    ) -> Result<OperationOutcome<ProviderResult>, ApiError> {
        orchestrator::with_fallback(
            request.op.as_str(),
            self.fallback_api_key.as_deref(),
            || retry::run(&self.retry_policy, &self.cancel, || self.primary.generate(request)),
            |key| async move {
                retry::run(&self.retry_policy, &self.cancel, || {
                    self.secondary.complete(request, &key)
                })
                .await
            },
        )
        .await
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
