//! Structured query intent and the text protocol used to obtain it.
//!
//! The intent comes back from a text-generation model, so parsing is tolerant
//! of the usual wrapping: the JSON may arrive inside a fenced code block, and
//! category codes the catalogue does not know are dropped rather than failing
//! the whole request. Anything that is not JSON after unwrapping is a
//! [`Error::QueryAnalysis`].

use crate::record::TestType;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

const FENCE: &str = "```";

/// Requirements extracted from one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    #[serde(default)]
    pub hard_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default, deserialize_with = "known_test_types")]
    pub required_test_types: BTreeSet<TestType>,
}

impl QueryIntent {
    pub fn with_required(types: impl IntoIterator<Item = TestType>) -> Self {
        Self {
            required_test_types: types.into_iter().collect(),
            ..Self::default()
        }
    }
}

fn known_test_types<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<TestType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|code| match code.parse::<TestType>() {
            Ok(t) => Some(t),
            Err(_) => {
                debug!(code = %code, "dropping unknown test type from intent");
                None
            }
        })
        .collect())
}

/// Instruction sent to the text-generation capability for `query`.
pub fn intent_prompt(query: &str) -> String {
    format!(
        r#"Analyze this job query and extract:
1. Hard skills (Java, Python, SQL, etc.)
2. Soft skills (leadership, communication, etc.)
3. Required test types: K (Knowledge), P (Personality), A (Ability)

Query: {query}

Respond ONLY in JSON format:
{{"hard_skills": ["skill1"], "soft_skills": ["skill2"], "required_test_types": ["K", "P"]}}"#
    )
}

/// Returns the body of the first fenced code block in `text`, or the trimmed
/// text itself when there is no complete fence.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };
    let after = &trimmed[open + FENCE.len()..];
    // Skip an info string such as `json`.
    let info_len = after
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after.len());
    let body = &after[info_len..];
    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => trimmed,
    }
}

/// Parses a model response into a [`QueryIntent`].
pub fn parse_intent_response(text: &str) -> Result<QueryIntent> {
    let json = strip_code_fence(text);
    serde_json::from_str(json).map_err(|e| {
        Error::QueryAnalysis(format!("intent response is not valid JSON ({e}): {}", preview(json)))
    })
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let intent = parse_intent_response(
            r#"{"hard_skills": ["Java"], "soft_skills": ["communication"], "required_test_types": ["K", "P"]}"#,
        )
        .unwrap();
        assert_eq!(intent.hard_skills, vec!["Java"]);
        assert_eq!(intent.soft_skills, vec!["communication"]);
        assert_eq!(
            intent.required_test_types,
            BTreeSet::from([TestType::Knowledge, TestType::Personality])
        );
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "Here you go:\n```json\n{\"hard_skills\": [], \"soft_skills\": [], \"required_test_types\": [\"A\"]}\n```\nAnything else?";
        let intent = parse_intent_response(text).unwrap();
        assert_eq!(
            intent.required_test_types,
            BTreeSet::from([TestType::Ability])
        );
    }

    #[test]
    fn test_parse_fence_without_language() {
        let text = "```\n{\"required_test_types\": [\"k\"]}\n```";
        let intent = parse_intent_response(text).unwrap();
        assert!(intent.required_test_types.contains(&TestType::Knowledge));
        assert!(intent.hard_skills.is_empty());
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_unknown_codes_dropped() {
        let intent =
            parse_intent_response(r#"{"required_test_types": ["K", "Q", "Knowledge & Skills"]}"#)
                .unwrap();
        assert_eq!(
            intent.required_test_types,
            BTreeSet::from([TestType::Knowledge])
        );
    }

    #[test]
    fn test_null_required_types_is_empty() {
        let intent = parse_intent_response(r#"{"required_test_types": null}"#).unwrap();
        assert!(intent.required_test_types.is_empty());
    }

    #[test]
    fn test_invalid_json_is_query_analysis_error() {
        let err = parse_intent_response("The query needs K and P tests.").unwrap_err();
        assert!(matches!(err, Error::QueryAnalysis(_)));

        let err = parse_intent_response("```json\nnot json\n```").unwrap_err();
        assert!(matches!(err, Error::QueryAnalysis(_)));
    }

    #[test]
    fn test_prompt_embeds_query() {
        let prompt = intent_prompt("Java developer");
        assert!(prompt.contains("Query: Java developer"));
        assert!(prompt.contains(r#""required_test_types": ["K", "P"]"#));
    }
}
