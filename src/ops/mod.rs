//! Operation-specific payload shapes and decoding.
//!
//! Provider adapters hand back untyped JSON; each operation expects one of
//! the shapes here. Decoding is explicit — a payload that does not match its
//! operation's shape is a parse failure for the whole call, never a partial
//! result. Missing optional arrays default to empty, as the prompts allow.

pub mod prompts;
pub mod schemas;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::llm::ProviderResult;
use crate::normalize;
use crate::types::{Article, Briefing, Entity, Meeting, Relationship, TimelineEvent, TopicReport};

fn decode<T: DeserializeOwned>(op: &str, payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload)
        .map_err(|e| ApiError::Parse(format!("{op} payload shape mismatch: {e}")))
}

#[derive(Debug, Deserialize)]
struct ReportPayload {
    #[serde(default)]
    report: ReportBody,
}

#[derive(Debug, Default, Deserialize)]
struct ReportBody {
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    graph: Graph,
}

#[derive(Debug, Default, Deserialize)]
struct Graph {
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

/// Decode an analysis/discovery payload into a [`TopicReport`], marking every
/// article analyzed and attaching the provider's grounding citations.
pub(crate) fn topic_report(result: ProviderResult) -> Result<TopicReport, ApiError> {
    let parsed: ReportPayload = decode("report", result.payload)?;
    Ok(TopicReport {
        articles: normalize::mark_analyzed(parsed.report.articles),
        citations: result.citations,
        entities: parsed.report.graph.entities,
        relationships: parsed.report.graph.relationships,
    })
}

pub(crate) fn meetings(result: ProviderResult) -> Result<Vec<Meeting>, ApiError> {
    #[derive(Deserialize)]
    struct MeetingsPayload {
        #[serde(default)]
        meetings: Vec<Meeting>,
    }
    let parsed: MeetingsPayload = decode("meetings", result.payload)?;
    Ok(normalize::finalize_meetings(parsed.meetings))
}

pub(crate) fn briefing(result: ProviderResult) -> Result<Briefing, ApiError> {
    decode("briefing", result.payload)
}

pub(crate) fn timeline(result: ProviderResult) -> Result<Vec<TimelineEvent>, ApiError> {
    #[derive(Deserialize)]
    struct TimelinePayload {
        #[serde(default)]
        events: Vec<TimelineEvent>,
    }
    let parsed: TimelinePayload = decode("timeline", result.payload)?;
    Ok(normalize::sort_timeline(parsed.events))
}

pub(crate) fn suggestions(result: ProviderResult) -> Result<Vec<String>, ApiError> {
    #[derive(Deserialize)]
    struct SuggestionsPayload {
        #[serde(default)]
        suggestions: Vec<String>,
    }
    let parsed: SuggestionsPayload = decode("suggestions", result.payload)?;
    Ok(parsed.suggestions)
}
