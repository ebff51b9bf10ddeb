//! Prompt builders for the seven operations.
//!
//! Each builder takes the data it interpolates as arguments — including the
//! current date as an ISO `YYYY-MM-DD` string — so prompt text is a pure
//! function of its inputs and testable without a clock.

use crate::types::{Article, Topic};

pub fn analyze_topic(topic_name: &str, query: &str, current_date: &str) -> String {
    format!(
        r#"As a top-tier intelligence analyst, your task is to investigate a topic and compile a complete intelligence report in a single step.
The current date is {current_date}. All information must be as recent as possible.

TOPIC: "{topic_name}"
INVESTIGATION FOCUS: "{query}"

INSTRUCTIONS:
1. Perform a web search to find 5-7 significant articles published within the last 36 hours relative to the current date.
2. For EACH article found, read its content and generate:
    a. A concise, one-sentence summary in both English ("summary_en") and Chinese ("summary_zh").
    b. A list of key entities mentioned ("entities"), each with an "id", "name", and "type".
3. From ALL articles combined, generate a consolidated knowledge graph. This graph should contain:
    a. "entities": A de-duplicated list of all unique entities.
    b. "relationships": A list of connections, where each has a "source" (entity id), "target" (entity id), and a descriptive "label".
4. Respond with a single JSON object inside a markdown code block (```json ... ```).
5. The JSON object must have a single top-level key: "report".
6. The "report" object must contain:
    - "articles": An array of article objects. Each object must have "title", "url", "publishedAt", "summary_en", "summary_zh", and "entities".
    - "graph": The consolidated knowledge graph object with its "entities" and "relationships".

Ensure all data is derived directly from the content of the articles you find."#
    )
}

pub fn discover_more(query: &str, existing_articles: &[Article], current_date: &str) -> String {
    let existing_urls = existing_articles
        .iter()
        .map(|a| format!("- {}", a.url))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"As a top-tier intelligence analyst, you are continuing an investigation. Find and analyze NEW articles related to the topic.
The current date is {current_date}.

INVESTIGATION FOCUS: "{query}"

EXISTING ARTICLES (to avoid duplication):
{existing_urls}

INSTRUCTIONS:
1. Perform a web search to find 3-5 NEW, significant articles about the investigation focus, published recently. DO NOT include any of the existing articles listed above.
2. For each NEW article, read its content and generate:
    a. A concise, one-sentence summary in English ("summary_en") and Chinese ("summary_zh").
    b. A list of key entities mentioned ("entities").
3. From the NEW articles, generate a knowledge graph containing "entities" and "relationships".
4. Respond with a single JSON object inside a markdown code block (```json ... ```), with a single top-level key "report".

Provide only fresh information."#
    )
}

pub fn upcoming_meetings(current_date: &str) -> String {
    format!(
        r#"As an intelligence analyst, perform a web search to find 5-7 significant UPCOMING international meetings.
The current date is {current_date}. The search should focus on events scheduled after this date for the rest of the current year. Focus on high-level engagements (e.g., G7, APEC, NATO, SCO, ASEAN Summits, major state visits). Sort them chronologically.

Respond with a JSON object inside a markdown code block (```json ... ```).
The object should contain a "meetings" key, which is an array. Each object in the array must have:
- eventName_en / eventName_zh
- participants (array of strings)
- dateText (e.g., "Late October 2024")
- dateISO (e.g., "2024-10-25")
- location_en / location_zh
- focus_en / focus_zh (a brief summary)
- involvesChina (boolean)"#
    )
}

pub fn daily_briefing(articles: &[Article]) -> String {
    let briefing_context = articles
        .iter()
        .filter_map(|a| {
            a.summary_en
                .as_deref()
                .map(|s| format!("- Title: {}\n  URL: {}\n  Summary: {}", a.title, a.url, s))
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        r#"As a geopolitical intelligence analyst, synthesize the following article summaries into a high-level briefing.

**Instructions:**
1.  Respond with a single JSON object.
2.  The JSON object must have two keys: "summary_en" and "summary_zh".
3.  The value for each key should be a string containing a markdown-formatted briefing.
4.  The briefing must include the following sections, precisely as named and formatted:
    -   `**Executive Summary:**` (1-2 concise sentences summarizing the overall situation).
    -   `**Key Developments:**` (A bulleted list of 3-5 of the most important events or data points. Use '*' for bullets).
    -   `**Strategic Implication:**` (A single sentence on the potential future impact or significance).
5.  Where relevant, cite the source article for a development using a markdown link like `[Source]({{URL}})`.

**Article Summaries to Analyze:**
{briefing_context}"#
    )
}

pub fn event_timeline(articles: &[Article]) -> String {
    let article_context = articles
        .iter()
        .filter_map(|a| {
            a.summary_en
                .as_deref()
                .map(|s| format!("- Title: {}\n  Summary: {}", a.title, s))
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        r#"As an intelligence analyst, analyze the provided article summaries to extract and order key events chronologically.

**Instructions:**
1.  Respond with a single JSON object with one key: "events".
2.  The "events" value must be an array of objects, where each object has `"date"` and `"event"`.
3.  Synthesize information to create a coherent, chronological timeline. Only include events clearly identified.
4.  If no clear sequence can be determined, return an empty "events" array.

**Article Summaries to Analyze:**
{article_context}"#
    )
}

pub fn related_topics(existing: &[Topic]) -> String {
    let queries = existing.iter().map(|t| t.query.as_str()).collect::<Vec<_>>().join(", ");
    format!(
        "Based on these topics: {queries}, suggest 5 related, specific geopolitical topics to monitor. \
         Respond with a JSON object containing a single key \"suggestions\" which is an array of 5 strings."
    )
}

pub fn trending_topics(current_date: &str) -> String {
    format!(
        r#"As a geopolitical analyst, perform a web search to identify 5 current, major international news topics.
The current date is {current_date}. Topics must be based on news from the last 48 hours.
Examples: 'Texas Flooding Crisis', 'Sudan Peace Talks'. Topics must be concise search queries.

Respond with a JSON object inside a markdown code block (```json ... ```).
The object should contain a single key "suggestions" which is an array of 5 strings."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, summary: Option<&str>) -> Article {
        Article {
            title: format!("title for {url}"),
            url: url.to_string(),
            published_at: None,
            summary_en: summary.map(String::from),
            summary_zh: None,
            entities: Vec::new(),
            is_analyzed: true,
        }
    }

    #[test]
    fn analyze_prompt_interpolates_topic_and_date() {
        let prompt = analyze_topic("South China Sea", "naval activity", "2024-06-01");
        assert!(prompt.contains("TOPIC: \"South China Sea\""));
        assert!(prompt.contains("INVESTIGATION FOCUS: \"naval activity\""));
        assert!(prompt.contains("The current date is 2024-06-01"));
        assert!(prompt.contains("```json"));
    }

    #[test]
    fn discover_prompt_lists_existing_urls() {
        let existing = vec![article("https://a", None), article("https://b", None)];
        let prompt = discover_more("naval activity", &existing, "2024-06-01");
        assert!(prompt.contains("- https://a"));
        assert!(prompt.contains("- https://b"));
        assert!(prompt.contains("DO NOT include"));
    }

    #[test]
    fn briefing_prompt_skips_articles_without_english_summary() {
        let articles = vec![
            article("https://a", Some("summarized")),
            article("https://b", None),
        ];
        let prompt = daily_briefing(&articles);
        assert!(prompt.contains("https://a"));
        assert!(!prompt.contains("https://b"));
    }

    #[test]
    fn suggestion_prompts_ask_for_suggestions_key() {
        let topics = vec![Topic { id: "1".into(), name: "Sahel".into(), query: "coups".into() }];
        assert!(related_topics(&topics).contains("coups"));
        assert!(related_topics(&topics).contains("\"suggestions\""));
        assert!(trending_topics("2024-06-01").contains("\"suggestions\""));
    }
}
