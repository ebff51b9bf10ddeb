//! Per-operation shaping of parsed provider payloads.
//!
//! Everything here is pure data transformation on domain types: the
//! adapters have already produced JSON, the operation has already
//! deserialized it, and these functions apply de-duplication, sorting, id
//! assignment, and analyzed-marking before the outcome reaches the caller.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::types::{Article, Meeting, TimelineEvent, Topic, TopicReport};

/// Mark every article as having been through analysis. Providers never set
/// this flag themselves.
pub fn mark_analyzed(mut articles: Vec<Article>) -> Vec<Article> {
    for article in &mut articles {
        article.is_analyzed = true;
    }
    articles
}

/// Merge a freshly discovered report into an existing one.
///
/// Articles dedupe by URL with the existing set winning; entities dedupe by
/// id with the last-seen entry winning (in the first-seen position);
/// relationships dedupe by the (source, target, label) triple. Fresh
/// citations are appended so newly discovered articles keep their
/// attribution.
pub fn merge_reports(existing: &TopicReport, fresh: TopicReport) -> TopicReport {
    let existing_urls: HashSet<&str> = existing.articles.iter().map(|a| a.url.as_str()).collect();
    let mut articles = existing.articles.clone();
    articles.extend(
        fresh
            .articles
            .into_iter()
            .filter(|a| !existing_urls.contains(a.url.as_str())),
    );

    let mut entities = Vec::new();
    let mut entity_slots: HashMap<String, usize> = HashMap::new();
    for entity in existing.entities.iter().cloned().chain(fresh.entities) {
        match entity_slots.get(&entity.id) {
            Some(&slot) => entities[slot] = entity,
            None => {
                entity_slots.insert(entity.id.clone(), entities.len());
                entities.push(entity);
            }
        }
    }

    let mut relationships = Vec::new();
    let mut seen_edges = HashSet::new();
    for rel in existing.relationships.iter().cloned().chain(fresh.relationships) {
        if seen_edges.insert((rel.source.clone(), rel.target.clone(), rel.label.clone())) {
            relationships.push(rel);
        }
    }

    let mut citations = existing.citations.clone();
    citations.extend(fresh.citations);

    TopicReport { articles, citations, entities, relationships }
}

/// Assign each meeting a stable identifier derived from its ISO date and
/// input position, then sort ascending by ISO date string.
pub fn finalize_meetings(meetings: Vec<Meeting>) -> Vec<Meeting> {
    let mut meetings: Vec<Meeting> = meetings
        .into_iter()
        .enumerate()
        .map(|(i, mut m)| {
            m.id = format!("{}-{}", m.date_iso, i);
            m
        })
        .collect();
    meetings.sort_by(|a, b| a.date_iso.cmp(&b.date_iso));
    meetings
}

/// Order timeline events chronologically.
///
/// Events whose date does not parse keep their original positions; the
/// parseable ones are reordered ascending among themselves (stable for
/// equal dates). Nothing is ever dropped.
pub fn sort_timeline(mut events: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    let mut dated: Vec<(usize, NaiveDate)> = events
        .iter()
        .enumerate()
        .filter_map(|(i, e)| parse_event_date(&e.date).map(|d| (i, d)))
        .collect();
    let slots: Vec<usize> = dated.iter().map(|&(i, _)| i).collect();
    dated.sort_by_key(|&(_, date)| date);

    let reordered: Vec<TimelineEvent> =
        dated.iter().map(|&(original, _)| events[original].clone()).collect();
    for (slot, event) in slots.into_iter().zip(reordered) {
        events[slot] = event;
    }
    events
}

/// Lenient date parse for model-produced timeline dates: full ISO date,
/// year-month, or bare year.
fn parse_event_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(year) = text.parse::<i32>() {
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

/// Drop suggestions that exactly match an existing topic name.
pub fn filter_suggestions(suggestions: Vec<String>, topics: &[Topic]) -> Vec<String> {
    suggestions
        .into_iter()
        .filter(|s| !topics.iter().any(|t| t.name == *s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GroundingCitation;
    use crate::types::{Entity, EntityKind, Relationship};

    fn article(url: &str) -> Article {
        Article {
            title: url.to_string(),
            url: url.to_string(),
            published_at: None,
            summary_en: Some(format!("summary of {url}")),
            summary_zh: None,
            entities: Vec::new(),
            is_analyzed: true,
        }
    }

    fn entity(id: &str, name: &str) -> Entity {
        Entity { id: id.to_string(), name: name.to_string(), kind: EntityKind::Other }
    }

    fn rel(source: &str, target: &str, label: &str) -> Relationship {
        Relationship {
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
        }
    }

    fn event(date: &str, what: &str) -> TimelineEvent {
        TimelineEvent { date: date.to_string(), event: what.to_string() }
    }

    #[test]
    fn mark_analyzed_sets_flag_on_every_article() {
        let mut raw = article("https://a");
        raw.is_analyzed = false;
        let marked = mark_analyzed(vec![raw]);
        assert!(marked.iter().all(|a| a.is_analyzed));
    }

    #[test]
    fn merge_dedupes_articles_by_url_existing_wins() {
        let mut existing_b = article("b");
        existing_b.title = "existing b".into();
        let mut fresh_b = article("b");
        fresh_b.title = "fresh b".into();

        let existing = TopicReport {
            articles: vec![article("a"), existing_b],
            ..TopicReport::default()
        };
        let fresh = TopicReport {
            articles: vec![fresh_b, article("c")],
            ..TopicReport::default()
        };

        let merged = merge_reports(&existing, fresh);
        let urls: Vec<&str> = merged.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert_eq!(merged.articles[1].title, "existing b");
    }

    #[test]
    fn merge_entities_last_seen_wins_in_first_position() {
        let existing = TopicReport {
            entities: vec![entity("us", "USA"), entity("cn", "China")],
            ..TopicReport::default()
        };
        let fresh = TopicReport {
            entities: vec![entity("us", "United States")],
            ..TopicReport::default()
        };
        let merged = merge_reports(&existing, fresh);
        assert_eq!(merged.entities.len(), 2);
        assert_eq!(merged.entities[0].name, "United States");
        assert_eq!(merged.entities[1].name, "China");
    }

    #[test]
    fn merge_relationships_dedupe_by_composite_key() {
        let existing = TopicReport {
            relationships: vec![rel("us", "cn", "sanctioned")],
            ..TopicReport::default()
        };
        let fresh = TopicReport {
            relationships: vec![rel("us", "cn", "sanctioned"), rel("us", "cn", "visited")],
            ..TopicReport::default()
        };
        let merged = merge_reports(&existing, fresh);
        assert_eq!(merged.relationships.len(), 2);
    }

    #[test]
    fn merge_appends_fresh_citations() {
        let existing = TopicReport {
            citations: vec![GroundingCitation { uri: Some("https://old".into()), title: None }],
            ..TopicReport::default()
        };
        let fresh = TopicReport {
            citations: vec![GroundingCitation { uri: Some("https://new".into()), title: None }],
            ..TopicReport::default()
        };
        let merged = merge_reports(&existing, fresh);
        assert_eq!(merged.citations.len(), 2);
    }

    #[test]
    fn meetings_get_derived_ids_and_sort_by_iso_date() {
        let make = |iso: &str| Meeting {
            id: String::new(),
            event_name_en: format!("meeting {iso}"),
            event_name_zh: None,
            participants: Vec::new(),
            date_text: String::new(),
            date_iso: iso.to_string(),
            location_en: None,
            location_zh: None,
            focus_en: None,
            focus_zh: None,
            involves_china: false,
        };
        let sorted = finalize_meetings(vec![make("2024-05-01"), make("2024-04-01")]);
        assert_eq!(sorted[0].date_iso, "2024-04-01");
        assert_eq!(sorted[0].id, "2024-04-01-1");
        assert_eq!(sorted[1].id, "2024-05-01-0");
    }

    #[test]
    fn timeline_sorts_parseable_dates_and_keeps_unparseable_in_place() {
        let sorted = sort_timeline(vec![
            event("2024-03-02", "second"),
            event("2024-03-01", "first"),
            event("not-a-date", "floating"),
        ]);
        assert_eq!(sorted[0].date, "2024-03-01");
        assert_eq!(sorted[1].date, "2024-03-02");
        assert_eq!(sorted[2].date, "not-a-date");
    }

    #[test]
    fn timeline_accepts_partial_dates() {
        let sorted = sort_timeline(vec![
            event("2024-06", "mid-year"),
            event("2023", "last year"),
        ]);
        assert_eq!(sorted[0].date, "2023");
        assert_eq!(sorted[1].date, "2024-06");
    }

    #[test]
    fn timeline_is_stable_for_equal_dates() {
        let sorted = sort_timeline(vec![
            event("2024-03-01", "morning session"),
            event("2024-03-01", "evening session"),
        ]);
        assert_eq!(sorted[0].event, "morning session");
        assert_eq!(sorted[1].event, "evening session");
    }

    #[test]
    fn suggestions_matching_topic_names_are_dropped() {
        let topics = vec![Topic {
            id: "1".into(),
            name: "South China Sea".into(),
            query: "naval activity".into(),
        }];
        let filtered = filter_suggestions(
            vec!["South China Sea".into(), "Arctic shipping routes".into()],
            &topics,
        );
        assert_eq!(filtered, vec!["Arctic shipping routes".to_string()]);
    }
}
