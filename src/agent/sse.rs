//! SSE stream ingestion.
//!
//! The agent API always answers with a server-sent-event body, even when no
//! streaming was requested. The whole body is buffered upstream; this module
//! reduces it to the stitched output text plus every citation that appeared.
//! Malformed or partial event lines are expected and dropped without error.

use serde_json::Value;

use super::{AgentResult, Citation};

const DATA_PREFIX: &str = "data: ";
const TEXT_DELTA_TYPE: &str = "response.output_text.delta";

/// Reduces a raw SSE body to `{ text, citations }`. Never fails: lines that
/// do not carry the data marker or do not parse as JSON are skipped.
pub fn ingest(raw: &str) -> AgentResult {
    let mut text = String::new();
    let mut citations = Vec::new();

    for line in raw.split('\n') {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        let Ok(event) = serde_json::from_str::<Value>(payload) else {
            continue;
        };

        if event.get("type").and_then(Value::as_str) == Some(TEXT_DELTA_TYPE) {
            if let Some(delta) = event.pointer("/response/delta").and_then(Value::as_str) {
                text.push_str(delta);
            }
        }

        // Citations move between keys across API versions. First non-absent
        // location wins; locations are never merged.
        if let Some(cites) = citation_array(&event) {
            for c in cites {
                citations.push(normalize_citation(c));
            }
        }
    }

    AgentResult { text, citations }
}

fn citation_array(event: &Value) -> Option<&Vec<Value>> {
    ["/citations", "/response/citations", "/response/search_results"]
        .into_iter()
        .find_map(|path| event.pointer(path).filter(|v| !v.is_null()))
        .and_then(Value::as_array)
}

fn normalize_citation(raw: &Value) -> Citation {
    Citation {
        title: first_str(raw, &["title", "name"]),
        url: first_str(raw, &["url", "link"]),
        snippet: first_str(raw, &["snippet", "description"]),
    }
}

fn first_str(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(s: &str) -> String {
        format!(r#"data: {{"type":"response.output_text.delta","response":{{"delta":"{s}"}}}}"#)
    }

    #[test]
    fn test_empty_input() {
        let result = ingest("");
        assert_eq!(result.text, "");
        assert!(result.citations.is_empty());
    }

    #[test]
    fn test_no_data_lines() {
        let raw = "event: ping\n: comment\nretry: 3000\n";
        let result = ingest(raw);
        assert_eq!(result.text, "");
        assert!(result.citations.is_empty());
    }

    #[test]
    fn test_deltas_concatenate_in_order() {
        let raw = [delta_line("Hello"), delta_line(", "), delta_line("world")].join("\n");
        assert_eq!(ingest(&raw).text, "Hello, world");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let raw = [
            delta_line("a"),
            "data: {broken json".to_string(),
            "data: ".to_string(),
            delta_line("b"),
            r#"data: {"type":"truncat"#.to_string(),
            delta_line("c"),
        ]
        .join("\n");
        assert_eq!(ingest(&raw).text, "abc");
    }

    #[test]
    fn test_non_delta_events_do_not_contribute_text() {
        let raw = r#"data: {"type":"response.done","response":{"delta":"ignored"}}"#;
        assert_eq!(ingest(raw).text, "");
    }

    #[test]
    fn test_missing_delta_defaults_to_empty() {
        let raw = r#"data: {"type":"response.output_text.delta","response":{}}"#;
        assert_eq!(ingest(raw).text, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = format!("{}\r\n{}\r\n", delta_line("x"), delta_line("y"));
        assert_eq!(ingest(&raw).text, "xy");
    }

    #[test]
    fn test_citations_top_level() {
        let raw = r#"data: {"type":"other","citations":[{"title":"T","url":"https://a.example","snippet":"S"}]}"#;
        let result = ingest(raw);
        assert_eq!(
            result.citations,
            vec![Citation {
                title: "T".to_string(),
                url: "https://a.example".to_string(),
                snippet: "S".to_string(),
            }]
        );
    }

    #[test]
    fn test_citations_first_location_wins_never_merged() {
        let raw = r#"data: {"citations":[{"title":"top"}],"response":{"citations":[{"title":"nested"}],"search_results":[{"title":"search"}]}}"#;
        let result = ingest(raw);
        assert_eq!(result.citations.len(), 1);
        assert_eq!(result.citations[0].title, "top");
    }

    #[test]
    fn test_citations_fall_through_to_search_results() {
        let raw = r#"data: {"response":{"search_results":[{"name":"N","link":"https://b.example","description":"D"}]}}"#;
        let result = ingest(raw);
        assert_eq!(
            result.citations,
            vec![Citation {
                title: "N".to_string(),
                url: "https://b.example".to_string(),
                snippet: "D".to_string(),
            }]
        );
    }

    #[test]
    fn test_null_citations_treated_as_absent() {
        let raw = r#"data: {"citations":null,"response":{"citations":[{"title":"nested"}]}}"#;
        let result = ingest(raw);
        assert_eq!(result.citations[0].title, "nested");
    }

    #[test]
    fn test_citation_missing_fields_default_empty() {
        let raw = r#"data: {"citations":[{}]}"#;
        let result = ingest(raw);
        assert_eq!(result.citations[0], Citation {
            title: String::new(),
            url: String::new(),
            snippet: String::new(),
        });
    }

    #[test]
    fn test_citations_collected_across_events_in_order() {
        let raw = [
            r#"data: {"citations":[{"title":"first"}]}"#,
            r#"data: {"citations":[{"title":"second"}]}"#,
        ]
        .join("\n");
        let titles: Vec<_> = ingest(&raw).citations.into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[test]
    fn test_text_and_citations_from_same_event() {
        let raw = r#"data: {"type":"response.output_text.delta","response":{"delta":"hi"},"citations":[{"title":"c"}]}"#;
        let result = ingest(raw);
        assert_eq!(result.text, "hi");
        assert_eq!(result.citations.len(), 1);
    }
}
