//! Post-LLM output cleanup.
//!
//! Some models prepend their reasoning in `<think>` blocks. Those blocks can
//! contain braces of their own, so they are removed before payload extraction.
//! A tag quoted inside a JSON string value is scenario content and stays.

use std::sync::LazyLock;

use regex::Regex;

static THINK_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^<think(?:ing)?>.*?</think(?:ing)?>").expect("valid regex"));

/// An opening tag with no closing tag: the model was cut off mid-thought.
static UNCLOSED_THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*<think(?:ing)?>.*$").expect("valid regex"));

static UNUSED_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<unused\d+>").expect("valid regex"));

/// Strip reasoning blocks and stray tokenizer artifacts from raw model output.
pub fn sanitize_llm_output(raw: &str) -> String {
    let text = strip_think_blocks(raw);
    let text = UNUSED_TOKEN_RE.replace_all(&text, "");

    // Leave an unclosed block alone when it holds the only JSON we have.
    if UNCLOSED_THINK_RE.is_match(&text) && !text.contains('{') {
        return String::new();
    }

    text.trim().to_string()
}

/// Remove closed think blocks that start outside JSON string literals.
///
/// Strings are only tracked inside braces, so quotes in surrounding prose
/// do not hide a block.
fn strip_think_blocks(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if c == '<' && !in_string {
            if let Some(m) = THINK_BLOCK_RE.find(rest) {
                rest = &rest[m.end()..];
                continue;
            }
        }

        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                '"' if depth > 0 => in_string = true,
                _ => {}
            }
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_think_block() {
        let raw = "<think>Preciso de {chaves} aqui</think>\n{\"cenarios_funcionais\": []}";
        assert_eq!(sanitize_llm_output(raw), "{\"cenarios_funcionais\": []}");
    }

    #[test]
    fn strips_multiline_thinking_variant() {
        let raw = "<THINKING>\nlinha 1\nlinha 2\n</THINKING>Resposta: {}";
        assert_eq!(sanitize_llm_output(raw), "Resposta: {}");
    }

    #[test]
    fn strips_several_blocks() {
        let raw = "<think>a</think>{\"x\": 1}<think>b</think>";
        assert_eq!(sanitize_llm_output(raw), "{\"x\": 1}");
    }

    #[test]
    fn think_tag_inside_json_string_is_kept() {
        let raw = r#"{"descricao": "Campo aceita <think>x</think> literal", "ok": "\"<think>y</think>"}"#;
        assert_eq!(sanitize_llm_output(raw), raw);
    }

    #[test]
    fn quotes_in_prose_do_not_protect_blocks() {
        let raw = "Segue o \"JSON\": <think>{rascunho}</think>{\"a\": 1}";
        assert_eq!(sanitize_llm_output(raw), "Segue o \"JSON\": {\"a\": 1}");
    }

    #[test]
    fn strips_unused_tokens() {
        assert_eq!(sanitize_llm_output("a <unused12>b<unused0>"), "a b");
    }

    #[test]
    fn unclosed_block_without_payload_is_empty() {
        assert_eq!(sanitize_llm_output("<think>ainda pensando..."), "");
    }

    #[test]
    fn unclosed_block_with_payload_is_kept() {
        let raw = "<think>ok {\"a\": 1}";
        assert_eq!(sanitize_llm_output(raw), raw);
    }

    #[test]
    fn clean_text_unchanged() {
        let text = "Segue o JSON:\n{\"meta_info\": {}}";
        assert_eq!(sanitize_llm_output(text), text);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(sanitize_llm_output(""), "");
        assert_eq!(sanitize_llm_output("   \n"), "");
    }
}
