//! geointel — geopolitical intelligence client.
//!
//! Issues structured generation requests to a primary grounded-search
//! provider, falls back to a chat-completions provider on quota exhaustion,
//! retries transient failures with exponential backoff, and normalizes both
//! providers' payloads into one set of domain shapes.
//!
//! Entry point is [`Client`]: construct it from a [`config::Config`] and call
//! one of the seven operations. Each returns an [`OperationOutcome`] carrying
//! the domain payload and whether the fallback provider served it.

pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod normalize;
pub mod ops;
pub mod orchestrator;
pub mod retry;
pub mod types;

pub use client::Client;
pub use error::{ApiError, AppError};
pub use llm::GroundingCitation;
pub use orchestrator::OperationOutcome;
pub use retry::RetryPolicy;
pub use types::{
    Article, Briefing, Entity, EntityKind, Language, Meeting, Relationship, TimelineEvent, Topic,
    TopicReport,
};
