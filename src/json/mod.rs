//! JSON extraction and best-effort repair of dirty LLM completions (spec §4.3).

mod extract;
mod repair;

pub use extract::extract_json;

use crate::core::ParseError;
use serde_json::Value;

/// The outcome of [`extract_and_parse`]: the parsed value, and whether repair was
/// needed to get there.
#[derive(Debug, Clone)]
pub struct ParsedJson {
    pub value: Value,
    pub repaired: bool,
}

/// Extracts a JSON substring from `text` and parses it, falling back to
/// [`repair::repair`] only if the strict parse fails. A successfully repaired value
/// is tagged `repaired: true`, which callers surface to consumers as
/// `__json_repair`.
pub fn extract_and_parse(text: &str) -> Result<ParsedJson, ParseError> {
    let candidate = extract_json(text)?;

    if let Ok(value) = serde_json::from_str(&candidate) {
        return Ok(ParsedJson {
            value,
            repaired: false,
        });
    }

    let repaired = repair::repair(&candidate);
    serde_json::from_str(&repaired)
        .map(|value| ParsedJson {
            value,
            repaired: true,
        })
        .map_err(|e| ParseError::MalformedJson {
            reason: e.to_string(),
            content: repaired,
        })
}
