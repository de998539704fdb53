//! Document Assembler: turns raw model output into the deliverable documents.
//!
//! Every function here is best-effort: malformed or missing input degrades to an
//! empty value (logged at `warn`), never to an error. The return types carry no
//! `Result` on purpose.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::llm_client::strip_json_fences;

/// Canonical marker the assembly prompt asks the model to emit between the two documents.
pub const PACKET_DELIMITER: &str = "===INTERVIEWEE_PACKET===";
/// Older marker still recognised when the canonical one is absent.
pub const LEGACY_EMAIL_DELIMITER: &str = "===INTERVIEWEE_EMAIL===";

/// Delimiters in priority order.
const DELIMITERS: &[&str] = &[PACKET_DELIMITER, LEGACY_EMAIL_DELIMITER];

/// Heading in the interviewee document that precedes the fact bullets.
pub const FACTS_SECTION_MARKER: &str = "what our research found";

pub const MAX_FACTS: usize = 5;
pub const MAX_INTERVIEWEE_QUESTIONS: usize = 5;
/// Bullets at or below this many characters are treated as noise.
const MIN_FACT_CHARS: usize = 20;

/// The two documents produced by the assembly stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocuments {
    pub interviewer: String,
    pub interviewee: String,
}

/// Splits the combined assembly output at the first recognised delimiter.
///
/// Without any delimiter the whole text is the interviewer document and the
/// interviewee document is empty.
pub fn split_documents(combined: &str) -> SplitDocuments {
    for delimiter in DELIMITERS {
        if let Some((before, after)) = combined.split_once(delimiter) {
            return SplitDocuments {
                interviewer: before.trim().to_string(),
                interviewee: after.trim().to_string(),
            };
        }
    }

    warn!("Assembly output has no interviewee delimiter; interviewee document left empty");
    SplitDocuments {
        interviewer: combined.to_string(),
        interviewee: String::new(),
    }
}

/// Extracts the first brace-delimited JSON object in `raw`, or `{}`.
pub fn extract_schema(raw: &str) -> Value {
    match parse_json_object(raw) {
        Some(value) => value,
        None => {
            warn!("Schema output held no parseable JSON object; using empty schema");
            json!({})
        }
    }
}

/// Up to `MAX_FACTS` bullet lines following the facts heading of the interviewee document.
pub fn extract_facts(interviewee_document: &str) -> Vec<String> {
    // ASCII lowercasing keeps byte offsets aligned with the original text.
    let lowered = interviewee_document.to_ascii_lowercase();
    let Some(position) = lowered.find(FACTS_SECTION_MARKER) else {
        warn!("Interviewee document has no facts section; no facts extracted");
        return Vec::new();
    };

    let section = &interviewee_document[position + FACTS_SECTION_MARKER.len()..];
    let mut facts = Vec::new();
    let mut in_list = false;

    // The first line is the tail of the heading itself.
    for line in section.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !is_bullet(line) {
            if in_list {
                break;
            }
            continue;
        }

        in_list = true;
        let fact = line.trim_start_matches(['-', '•', '*', ' ']).trim();
        if fact.chars().count() > MIN_FACT_CHARS {
            facts.push(fact.to_string());
            if facts.len() == MAX_FACTS {
                break;
            }
        }
    }

    facts
}

/// Up to `MAX_INTERVIEWEE_QUESTIONS` entries of `interviewee_questions` in the
/// question-stage output. Entries may be strings or objects with a `text` (or
/// `question`) field.
pub fn extract_interviewee_questions(questions_output: &str) -> Vec<String> {
    let Some(value) = parse_json_object(questions_output) else {
        warn!("Question output held no parseable JSON object; no interviewee questions");
        return Vec::new();
    };

    let Some(items) = value.get("interviewee_questions").and_then(Value::as_array) else {
        warn!("Question output has no interviewee_questions array");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(question_text)
        .filter(|q| !q.is_empty())
        .take(MAX_INTERVIEWEE_QUESTIONS)
        .collect()
}

fn question_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(map) => text_field(map),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>) -> Option<String> {
    ["text", "question"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
}

fn is_bullet(line: &str) -> bool {
    // "**Heading**" is bold markdown, not a bullet.
    !line.starts_with("**") && line.starts_with(['-', '•', '*'])
}

/// Parses `text` as a JSON object, tolerating code fences and surrounding prose.
fn parse_json_object(text: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(strip_json_fences(text)) {
        return Some(value);
    }
    let candidate = first_brace_block(text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// The first balanced `{ ... }` span in `text`, ignoring braces inside JSON strings.
fn first_brace_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_without_delimiter_keeps_whole_text() {
        let text = "  # Brief\nOnly one document here.\n";
        let docs = split_documents(text);
        assert_eq!(docs.interviewer, text);
        assert_eq!(docs.interviewee, "");

        // Splitting the result again changes nothing.
        let again = split_documents(&docs.interviewer);
        assert_eq!(again, docs);
    }

    #[test]
    fn test_split_on_canonical_delimiter() {
        let text = "# Brief\nbody\n\n===INTERVIEWEE_PACKET===\n\nHello Jane,\n";
        let docs = split_documents(text);
        assert_eq!(docs.interviewer, "# Brief\nbody");
        assert_eq!(docs.interviewee, "Hello Jane,");

        let rebuilt = format!("{}\n{}\n{}", docs.interviewer, PACKET_DELIMITER, docs.interviewee);
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&rebuilt), normalize(text));
    }

    #[test]
    fn test_split_on_legacy_delimiter() {
        let docs = split_documents("brief ===INTERVIEWEE_EMAIL=== email");
        assert_eq!(docs.interviewer, "brief");
        assert_eq!(docs.interviewee, "email");
    }

    #[test]
    fn test_canonical_delimiter_takes_priority() {
        let docs = split_documents("a ===INTERVIEWEE_EMAIL=== b ===INTERVIEWEE_PACKET=== c");
        assert_eq!(docs.interviewer, "a ===INTERVIEWEE_EMAIL=== b");
        assert_eq!(docs.interviewee, "c");
    }

    #[test]
    fn test_schema_from_surrounding_prose() {
        assert_eq!(extract_schema(r#"prefix {"a":1} suffix"#), json!({"a": 1}));
    }

    #[test]
    fn test_schema_without_braces_is_empty_object() {
        assert_eq!(extract_schema("no structure here"), json!({}));
        assert_eq!(extract_schema(""), json!({}));
    }

    #[test]
    fn test_schema_malformed_is_empty_object() {
        assert_eq!(extract_schema("{ not: json, }"), json!({}));
        assert_eq!(extract_schema("{\"open\": 1"), json!({}));
    }

    #[test]
    fn test_schema_nested_and_string_braces() {
        let raw = "Here: {\"outer\": {\"inner\": \"has } brace\"}} and {\"second\": 2}";
        assert_eq!(
            extract_schema(raw),
            json!({"outer": {"inner": "has } brace"}})
        );
    }

    #[test]
    fn test_schema_inside_code_fence() {
        let raw = "```json\n{\"sector\": \"energy\"}\n```";
        assert_eq!(extract_schema(raw), json!({"sector": "energy"}));
    }

    const PACKET: &str = "Hello Dana,\n\
        Thank you for agreeing to speak with us.\n\n\
        **Here's what our research found:**\n\
        - Acme Robotics was founded in 2015 in Austin, Texas.\n\
        - short\n\
        • The company sells industrial automation cells to factories.\n\
        * Acme employs roughly 120 people across two sites.\n\n\
        **We'd love your help correcting us.**\n\
        - This bullet belongs to another section entirely.\n";

    #[test]
    fn test_facts_follow_marker_and_skip_noise() {
        let facts = extract_facts(PACKET);
        assert_eq!(
            facts,
            vec![
                "Acme Robotics was founded in 2015 in Austin, Texas.".to_string(),
                "The company sells industrial automation cells to factories.".to_string(),
                "Acme employs roughly 120 people across two sites.".to_string(),
            ]
        );
    }

    #[test]
    fn test_facts_capped() {
        let mut doc = String::from("Here's what our research found:\n");
        for i in 0..8 {
            doc.push_str(&format!("- Fact number {i} is long enough to keep.\n"));
        }
        assert_eq!(extract_facts(&doc).len(), MAX_FACTS);
    }

    #[test]
    fn test_facts_without_marker_is_empty() {
        assert!(extract_facts("- A bullet with plenty of characters in it").is_empty());
        assert!(extract_facts("").is_empty());
    }

    #[test]
    fn test_questions_accept_strings_and_objects() {
        let output = r#"{
            "interviewer_questions": [{"question": "ignored"}],
            "interviewee_questions": [
                "How did the company start?",
                {"text": "Where is the market heading?"},
                {"question": "What would you tell a founder?"},
                {"other": "no text field"},
                42
            ]
        }"#;
        assert_eq!(
            extract_interviewee_questions(output),
            vec![
                "How did the company start?".to_string(),
                "Where is the market heading?".to_string(),
                "What would you tell a founder?".to_string(),
            ]
        );
    }

    #[test]
    fn test_questions_capped_and_fenced() {
        let items: Vec<String> = (0..7).map(|i| format!("\"Question {i}?\"")).collect();
        let output = format!(
            "```json\n{{\"interviewee_questions\": [{}]}}\n```",
            items.join(",")
        );
        assert_eq!(
            extract_interviewee_questions(&output).len(),
            MAX_INTERVIEWEE_QUESTIONS
        );
    }

    #[test]
    fn test_questions_degrade_to_empty() {
        assert!(extract_interviewee_questions("not json").is_empty());
        assert!(extract_interviewee_questions(r#"{"interviewee_questions": "nope"}"#).is_empty());
        assert!(extract_interviewee_questions(r#"{"other": []}"#).is_empty());
    }
}
