//! Domain types shared across operations.
//!
//! Field renames track the JSON contract the prompts establish with the
//! providers (camelCase and `_en`/`_zh` suffixed keys), so provider payloads
//! deserialize into these types directly.

use serde::{Deserialize, Serialize};

/// Coarse classification for a knowledge-graph entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Organization,
    Location,
    Policy,
    Event,
    Other,
}

impl Default for EntityKind {
    fn default() -> Self {
        EntityKind::Other
    }
}

/// A node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable slug the model assigns, e.g. `"joe_biden"`.
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: EntityKind,
}

/// A directed, labelled edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source entity id.
    pub source: String,
    /// Target entity id.
    pub target: String,
    /// e.g. `"visited"`, `"criticized"`, `"signed"`.
    pub label: String,
}

/// One analyzed news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub summary_en: Option<String>,
    #[serde(default)]
    pub summary_zh: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Set by normalization once the article has been through analysis.
    /// Never produced by a provider.
    #[serde(rename = "isAnalyzed", default)]
    pub is_analyzed: bool,
}

/// A monitored topic, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// Free-text investigation focus used in prompts.
    pub query: String,
}

/// An upcoming high-level meeting or summit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    /// Derived identifier, assigned during normalization from the ISO date
    /// and the item's original position. Empty as received from a provider.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "eventName_en")]
    pub event_name_en: String,
    #[serde(rename = "eventName_zh", default)]
    pub event_name_zh: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    /// Human-readable date, e.g. `"Late October 2024"`.
    #[serde(rename = "dateText", default)]
    pub date_text: String,
    /// Machine-sortable date, e.g. `"2024-10-25"`.
    #[serde(rename = "dateISO", default)]
    pub date_iso: String,
    #[serde(default)]
    pub location_en: Option<String>,
    #[serde(default)]
    pub location_zh: Option<String>,
    #[serde(default)]
    pub focus_en: Option<String>,
    #[serde(default)]
    pub focus_zh: Option<String>,
    #[serde(rename = "involvesChina", default)]
    pub involves_china: bool,
}

/// One dated entry in an event timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub event: String,
}

/// Display language for bilingual content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Zh,
}

/// A synthesized briefing in both languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    pub summary_en: String,
    #[serde(default)]
    pub summary_zh: Option<String>,
}

impl Briefing {
    /// Pick the variant for `lang`, falling back to English when the Chinese
    /// variant is absent.
    pub fn text(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.summary_en,
            Language::Zh => self.summary_zh.as_deref().unwrap_or(&self.summary_en),
        }
    }
}

/// The analyze/discover outcome: articles plus the consolidated graph and
/// any grounding citations the primary provider supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicReport {
    pub articles: Vec<Article>,
    pub citations: Vec<crate::llm::GroundingCitation>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}
