//! Extraction of a JSON object/array out of free-text LLM output.
//!
//! LLM output is treated as a bytestring from an adversarial source:
//! validate, don't trust. These functions are the only place in the crate
//! where that adversarial input is handled directly.

use regex::Regex;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static fence regex is valid"));

static NUMBER_THEN_QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(-?\d+(?:\.\d+)?)\s*"[^"]*""#).expect("static number-then-quote regex is valid")
});

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("static trailing-comma regex is valid"));

/// Pulls a candidate JSON object/array out of raw LLM text, following the
/// documented fallback order: fenced code block, then latest occurrence of
/// `key` walked back to the nearest `{`, then the first `{`/`[` in the
/// document. Returns `None` only if the text contains no `{` or `[` at all.
#[must_use]
pub fn extract_candidate(text: &str, key: &str) -> Option<String> {
    if let Some(captures) = FENCE.captures(text) {
        let inner = captures.get(1)?.as_str();
        if let Some(balanced) = extract_balanced(inner) {
            return Some(balanced);
        }
    }

    let quoted_key = format!("\"{key}\"");
    let start = if let Some(key_pos) = text.rfind(&quoted_key) {
        text[..key_pos].rfind('{')
    } else {
        None
    };

    let start = start.or_else(|| {
        let brace = text.find('{');
        let bracket = text.find('[');
        match (brace, bracket) {
            (Some(b), Some(k)) => Some(b.min(k)),
            (Some(b), None) => Some(b),
            (None, Some(k)) => Some(k),
            (None, None) => None,
        }
    })?;

    extract_balanced(&text[start..])
}

/// Extracts a balanced `{...}` or `[...]` from the start of `text`,
/// tracking string state (with backslash escapes) and nesting depth so
/// trailing prose after the closer does not break extraction. If the
/// input is truncated before the matching closer, returns everything
/// collected so far (the "longest balanced prefix").
#[must_use]
pub fn extract_balanced(text: &str) -> Option<String> {
    let mut chars = text.char_indices();
    let (_, opener) = chars.next()?;
    let closer = match opener {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };

    let mut depth: i32 = 1;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = text.len();

    for (idx, ch) in chars {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            c if c == opener => depth += 1,
            c if c == closer => {
                depth -= 1;
                if depth == 0 {
                    end = idx + ch.len_utf8();
                    break;
                }
            }
            _ => {}
        }
    }

    Some(text[..end].to_string())
}

/// Sanitizes already-extracted JSON text before structured parsing:
/// strips a stray quoted token immediately following a number (observed
/// from models that emit `1.0"High"` style annotations) and strips
/// trailing commas before `}` or `]`. On already-clean input this is the
/// identity.
#[must_use]
pub fn sanitize(json: &str) -> String {
    let no_stray_quotes = NUMBER_THEN_QUOTE.replace_all(json, "$1");
    TRAILING_COMMA.replace_all(&no_stray_quotes, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_fenced_block() {
        let text = "here you go:\n```json\n{\"recommendations\":[]}\n```\nhope that helps";
        assert_eq!(extract_candidate(text, "recommendations").unwrap(), "{\"recommendations\":[]}");
    }

    #[test]
    fn extracts_balanced_object_ignoring_trailing_prose() {
        let text = "preamble {\"recommendations\":[{\"name\":\"A\"}]} trailing prose that is not json";
        let extracted = extract_candidate(text, "recommendations").unwrap();
        assert_eq!(extracted, "{\"recommendations\":[{\"name\":\"A\"}]}");
    }

    #[test]
    fn returns_longest_balanced_prefix_when_unterminated() {
        let text = "{\"recommendations\":[{\"name\":\"A\"";
        let extracted = extract_balanced(text).unwrap();
        assert_eq!(extracted, text);
    }

    #[test]
    fn falls_back_to_first_brace_when_key_absent() {
        let text = "no json keys here but { \"a\": 1 }";
        assert_eq!(extract_candidate(text, "recommendations").unwrap(), "{ \"a\": 1 }");
    }

    #[test]
    fn sanitizer_is_identity_on_clean_json() {
        let clean = r#"{"recommendations":[{"name":"A","confidenceScore":0.8}]}"#;
        assert_eq!(sanitize(clean), clean);
    }

    #[test]
    fn sanitizer_strips_stray_quote_after_number() {
        let dirty = r#"{"confidenceScore":1.0"High"}"#;
        assert_eq!(sanitize(dirty), r#"{"confidenceScore":1.0}"#);
    }

    #[test]
    fn sanitizer_strips_trailing_commas() {
        let dirty = r#"{"a":[1,2,],}"#;
        assert_eq!(sanitize(dirty), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn balanced_extraction_ignores_braces_inside_strings() {
        let text = r#"{"name":"a { b } c"}"#;
        assert_eq!(extract_balanced(text).unwrap(), text);
    }
}
