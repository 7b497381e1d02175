//! Pulling a candidate JSON substring out of free-form LLM text (spec §4.3 step 1-3).

use crate::core::ParseError;

/// Extracts the candidate JSON substring from `text`.
///
/// 1. If the text is wrapped in a markdown fence (```` ```json ```` or ` ``` `),
///    the fenced region is returned directly.
/// 2. Otherwise the outermost balanced `{...}` pair is found via a string-aware
///    brace scanner (respecting quote state and backslash escapes). When several
///    top-level objects are present, the largest by length wins.
/// 3. The result is trimmed. [`ParseError::NoJsonFound`] if nothing balances.
pub fn extract_json(text: &str) -> Result<String, ParseError> {
    if let Some(fenced) = extract_fenced(text) {
        return Ok(fenced.trim().to_string());
    }

    let candidates = find_balanced_objects(text);
    candidates
        .into_iter()
        .max_by_key(|s| s.len())
        .map(|s| s.trim().to_string())
        .ok_or(ParseError::NoJsonFound)
}

fn extract_fenced(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let start = trimmed.find("```")?;
    let after_open = &trimmed[start + 3..];
    // Skip an optional language tag (e.g. `json`) up to the first newline.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let end = body.find("```")?;
    Some(body[..end].to_string())
}

/// String-aware brace scanner: finds every top-level balanced `{...}` substring,
/// never descending into or interpreting braces that occur inside a JSON string
/// literal (tracking escape state so `\"` doesn't prematurely end a string).
fn find_balanced_objects(text: &str) -> Vec<String> {
    let bytes: Vec<char> = text.chars().collect();
    let mut objects = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == '{' {
            if let Some(end) = scan_balanced_from(&bytes, i) {
                let object: String = bytes[i..=end].iter().collect();
                objects.push(object);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }

    objects
}

/// Returns the index of the matching closing `}` for the `{` at `start`, or `None`
/// if the braces never balance before the text ends.
fn scan_balanced_from(chars: &[char], start: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &ch) in chars.iter().enumerate().skip(start) {
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
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
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
    fn extracts_fenced_json() {
        let text = "here you go:\n```json\n{\"a\": 1}\n```\nhope that helps";
        assert_eq!(extract_json(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn extracts_bare_braces() {
        let text = "The answer is {\"a\": 1} thanks.";
        assert_eq!(extract_json(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn picks_largest_of_multiple_top_level_objects() {
        let text = "{\"a\":1} and also {\"a\":1,\"b\":2}";
        assert_eq!(extract_json(text).unwrap(), "{\"a\":1,\"b\":2}");
    }

    #[test]
    fn ignores_braces_inside_string_literals() {
        let text = r#"{"note": "a { b } c", "n": 1}"#;
        assert_eq!(extract_json(text).unwrap(), text);
    }

    #[test]
    fn respects_escaped_quotes_inside_strings() {
        let text = r#"{"note": "she said \"hi { there\"", "n": 1}"#;
        assert_eq!(extract_json(text).unwrap(), text);
    }

    #[test]
    fn no_json_found_errors() {
        assert!(matches!(
            extract_json("no json here"),
            Err(ParseError::NoJsonFound)
        ));
    }
}
