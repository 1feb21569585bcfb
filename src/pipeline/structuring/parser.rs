use serde_json::Value;

use super::output_sanitize::sanitize_llm_output;
use super::payload::{extract_payload, PayloadKind, PayloadSpan};
use super::StructuringError;

/// Extraction passes before giving up: the first one plus a single retry.
pub const MAX_EXTRACTION_PASSES: usize = 2;

/// Result of turning a raw model response into a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub payload: Value,
    /// How the candidate that parsed was obtained.
    pub kind: PayloadKind,
    /// Extraction passes used (1 or 2).
    pub passes: usize,
}

/// Parse a raw model response.
///
/// Reasoning blocks are stripped, a payload candidate is extracted and
/// parsed. On a parse failure the extractor runs once more on the candidate
/// itself; if that yields the same text it is a fixed point and the failure
/// is final.
pub fn parse_model_response(raw: &str) -> Result<ParsedResponse, StructuringError> {
    let cleaned = sanitize_llm_output(raw);
    if cleaned.is_empty() {
        return Err(StructuringError::EmptyResponse);
    }

    let mut candidate = extract_payload(&cleaned);
    if candidate.is_ambiguous() {
        tracing::warn!(
            kind = candidate.kind.as_str(),
            "No balanced JSON object in model response"
        );
    }

    let mut passes = 1;
    loop {
        let message = match serde_json::from_str::<Value>(candidate.text) {
            Ok(payload) => {
                return Ok(ParsedResponse {
                    payload,
                    kind: candidate.kind,
                    passes,
                })
            }
            Err(e) => e.to_string(),
        };

        let next = if passes < MAX_EXTRACTION_PASSES {
            Some(extract_payload(candidate.text))
        } else {
            None
        };

        match next {
            Some(next) if next.text != candidate.text => {
                tracing::debug!(
                    pass = passes,
                    error = %message,
                    "Candidate unparseable, retrying extraction"
                );
                candidate = next;
                passes += 1;
            }
            _ => {
                tracing::debug!(pass = passes, "Extraction reached a fixed point");
                return Err(final_error(&candidate, message, passes));
            }
        }
    }
}

fn final_error(candidate: &PayloadSpan<'_>, message: String, passes: usize) -> StructuringError {
    if candidate.kind == PayloadKind::Unchanged && !candidate.text.contains('{') {
        StructuringError::PayloadNotFound
    } else {
        StructuringError::JsonParsing { message, passes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_prose_wrapped_object() {
        let parsed = parse_model_response(
            "Claro! Aqui está:\n```json\n{\"cenarios_funcionais\": [{\"id\": \"CT-01\"}]}\n```\nBoa sorte.",
        )
        .unwrap();
        assert_eq!(parsed.payload, json!({"cenarios_funcionais": [{"id": "CT-01"}]}));
        assert_eq!(parsed.kind, PayloadKind::Balanced);
        assert_eq!(parsed.passes, 1);
    }

    #[test]
    fn think_block_braces_do_not_confuse_extraction() {
        let parsed =
            parse_model_response("<think>talvez {isso}</think> {\"meta_info\": {}}").unwrap();
        assert_eq!(parsed.payload, json!({"meta_info": {}}));
    }

    #[test]
    fn truncated_response_fails_at_fixed_point() {
        let err = parse_model_response(r#"{"cenarios_funcionais": [{"id": "CT-01"}, {"id": "CT"#)
            .unwrap_err();
        match err {
            StructuringError::JsonParsing { passes, .. } => assert_eq!(passes, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_balanced_candidate_fails_without_looping() {
        let err = parse_model_response("{'aspas': 'simples'}").unwrap_err();
        assert!(matches!(err, StructuringError::JsonParsing { passes: 1, .. }));
    }

    #[test]
    fn prose_only_is_payload_not_found() {
        let err = parse_model_response("Não consegui gerar os cenários.").unwrap_err();
        assert!(matches!(err, StructuringError::PayloadNotFound));
    }

    #[test]
    fn empty_or_reasoning_only_is_empty_response() {
        assert!(matches!(
            parse_model_response("  ").unwrap_err(),
            StructuringError::EmptyResponse
        ));
        assert!(matches!(
            parse_model_response("<think>nada</think>").unwrap_err(),
            StructuringError::EmptyResponse
        ));
    }

    #[test]
    fn non_object_json_still_parses() {
        // Normalization turns this into an empty record later.
        let parsed = parse_model_response("[1, 2, 3]").unwrap();
        assert_eq!(parsed.kind, PayloadKind::Unchanged);
        assert_eq!(parsed.payload, json!([1, 2, 3]));
    }

    #[test]
    fn extraction_is_a_fixed_point_on_its_output() {
        for raw in [
            "texto {\"a\": 1} mais texto",
            "{\"a\": [1, {\"b\": 2}, \"x}",
            "sem chaves",
            "{ aberto",
        ] {
            let once = extract_payload(raw);
            let twice = extract_payload(once.text);
            assert_eq!(once.text, twice.text, "not a fixed point for {raw:?}");
        }
    }
}
