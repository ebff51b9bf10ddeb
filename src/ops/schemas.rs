//! Response-schema descriptors for schema-mode requests.
//!
//! These follow the primary provider's schema dialect (uppercase type names).
//! Grounded-mode operations carry no schema — their output contract lives in
//! the prompt's fence instruction instead.

use serde_json::{Value, json};

pub fn briefing() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary_en": { "type": "STRING" },
            "summary_zh": { "type": "STRING" }
        },
        "required": ["summary_en"]
    })
}

pub fn timeline() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "events": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "date": { "type": "STRING" },
                        "event": { "type": "STRING" }
                    },
                    "required": ["date", "event"]
                }
            }
        },
        "required": ["events"]
    })
}

pub fn suggestions() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestions": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["suggestions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_are_object_rooted() {
        for schema in [briefing(), timeline(), suggestions()] {
            assert_eq!(schema["type"], "OBJECT");
            assert!(schema["required"].is_array());
        }
    }
}
