//! Best-effort repair of JSON that failed a strict parse (spec §4.3).
//!
//! Repair never parses content outside the window [`extract_json`](super::extract_json)
//! already carved out, and never changes nesting depth — it only rewrites tokens in
//! place: quotes, unquoted keys, trailing commas, and raw newlines inside strings.

use regex::Regex;
use std::sync::LazyLock;

static UNQUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([{,]\s*)([A-Za-z_][\w-]*)(\s*:)"#).unwrap());
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Rule (a): curly/smart quotes -> ASCII.
fn replace_smart_quotes(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}

/// Rule (b): single-quoted strings -> double-quoted, respecting escapes. Leaves
/// already-double-quoted strings untouched so apostrophes inside them survive.
fn convert_single_quoted_strings(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut in_double = false;
    let mut escaped = false;

    while i < chars.len() {
        let c = chars[i];

        if in_double {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_double = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_double = true;
            out.push(c);
            i += 1;
            continue;
        }

        if c == '\'' {
            // Scan to the matching unescaped closing quote.
            let mut j = i + 1;
            let mut body = String::new();
            let mut closed = false;
            while j < chars.len() {
                let d = chars[j];
                if d == '\\' && j + 1 < chars.len() {
                    body.push(d);
                    body.push(chars[j + 1]);
                    j += 2;
                    continue;
                }
                if d == '\'' {
                    closed = true;
                    j += 1;
                    break;
                }
                body.push(d);
                j += 1;
            }
            if closed {
                out.push('"');
                out.push_str(&body.replace("\\'", "'").replace('"', "\\\""));
                out.push('"');
                i = j;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Rule (c): quote unquoted object keys matching `[A-Za-z_][\w-]*` when preceded by
/// `{` or `,` and followed by `:`.
fn quote_unquoted_keys(input: &str) -> String {
    UNQUOTED_KEY
        .replace_all(input, |caps: &regex::Captures| {
            format!("{}\"{}\"{}", &caps[1], &caps[2], &caps[3])
        })
        .into_owned()
}

/// Rule (d): remove trailing commas before `}` or `]`.
fn remove_trailing_commas(input: &str) -> String {
    TRAILING_COMMA.replace_all(input, "$1").into_owned()
}

/// Rule (e): escape raw newline/carriage-return characters, but only inside JSON
/// string literals.
fn escape_raw_newlines_in_strings(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                out.push(c);
                escaped = false;
                continue;
            }
            match c {
                '\\' => {
                    out.push(c);
                    escaped = true;
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                _ => out.push(c),
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }

    out
}

/// Applies all repair rules, in spec order, to `candidate`.
pub fn repair(candidate: &str) -> String {
    let s = replace_smart_quotes(candidate);
    let s = convert_single_quoted_strings(&s);
    let s = quote_unquoted_keys(&s);
    let s = remove_trailing_commas(&s);
    escape_raw_newlines_in_strings(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_single_quoted_strings() {
        let input = "{'a': 'hello world'}";
        let repaired = repair(input);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], "hello world");
    }

    #[test]
    fn quotes_unquoted_keys() {
        let input = r#"{a: 1, b: "two"}"#;
        let repaired = repair(input);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], "two");
    }

    #[test]
    fn removes_trailing_commas() {
        let input = r#"{"a": [1, 2, 3,], "b": 2,}"#;
        let repaired = repair(input);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"][2], 3);
    }

    #[test]
    fn replaces_smart_quotes() {
        let input = "{\u{201C}a\u{201D}: \u{201C}b\u{201D}}";
        let repaired = repair(input);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["a"], "b");
    }

    #[test]
    fn valid_json_is_untouched_by_repair_classes() {
        let input = r#"{"a": 1, "b": "two"}"#;
        assert_eq!(repair(input), input);
    }
}
