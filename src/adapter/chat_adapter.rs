//! ChatAdapter (spec §4.5): field markers `[[ ## name ## ]]`, with heuristic
//! fallback extraction when a required marker never shows up.

use std::sync::LazyLock;
use async_trait::async_trait;
use regex::Regex;

use super::coerce::coerce_outputs;
use super::Adapter;
use crate::core::{Example, Field, FieldKind, FieldMap, FieldValue, ParseError, Signature};
use crate::data::Message;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[\s*##\s*([A-Za-z_][A-Za-z0-9_]*)\s*##\s*\]\]").unwrap());

#[derive(Default, Clone)]
pub struct ChatAdapter {
    reasoning: bool,
}

impl ChatAdapter {
    pub fn new() -> Self {
        ChatAdapter::default()
    }

    fn marker_block(field: &Field) -> String {
        format!("[[ ## {} ## ]]\n{{{}}}\n\n", field.name, field.name)
    }

    fn render_demo(&self, signature: &Signature, demo: &Example) -> Vec<Message> {
        let mut user = String::new();
        for field in signature.inputs() {
            if let Some(v) = demo.input.get(&field.name) {
                user.push_str(&format!("[[ ## {} ## ]]\n{}\n\n", field.name, render(v)));
            }
        }
        let mut assistant = String::new();
        if self.reasoning {
            if let Some(v) = demo.output.get("reasoning") {
                assistant.push_str(&format!("[[ ## reasoning ## ]]\n{}\n\n", render(v)));
            }
        }
        for field in signature.outputs() {
            if let Some(v) = demo.output.get(&field.name) {
                assistant.push_str(&format!("[[ ## {} ## ]]\n{}\n\n", field.name, render(v)));
            }
        }
        vec![Message::user(user), Message::assistant(assistant)]
    }
}

fn render(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

#[async_trait]
impl Adapter for ChatAdapter {
    fn format(&self, signature: &Signature, inputs: &FieldMap, demos: &[Example]) -> Vec<Message> {
        let mut messages = Vec::new();

        let mut system = signature.description.clone();
        if self.reasoning {
            system.push_str("\n\nBefore your final answer, think step by step in a `reasoning` field.");
        }
        system.push_str(
            "\n\nStructure your response using markers of the form `[[ ## field_name ## ]]` \
             for each of the following fields, in order:\n",
        );
        if self.reasoning {
            system.push_str("[[ ## reasoning ## ]]\n{reasoning}\n\n");
        }
        for field in signature.outputs() {
            system.push_str(&Self::marker_block(field));
        }
        messages.push(Message::system(system));

        for demo in demos {
            messages.extend(self.render_demo(signature, demo));
        }

        let mut user = String::new();
        for field in signature.inputs() {
            if let Some(v) = inputs.get(&field.name) {
                user.push_str(&format!("[[ ## {} ## ]]\n{}\n\n", field.name, render(v)));
            }
        }
        messages.push(Message::user(user));

        messages
    }

    async fn parse(&self, signature: &Signature, completion: &str) -> Result<FieldMap, ParseError> {
        let marker_positions = locate_markers(completion);
        let mut raw = FieldMap::new();
        let mut missing = Vec::new();

        for field in signature.outputs() {
            let value = marker_positions
                .iter()
                .find(|(name, _, _)| name == &field.name)
                .map(|(_, value_start, value_end)| completion[*value_start..*value_end].trim());

            let value = match value {
                Some(v) => Some(v.to_string()),
                None => heuristic_extract(completion, &field.name),
            };

            match value {
                Some(text) => {
                    raw.insert(field.name.clone(), interpret(field, &text));
                }
                None => {
                    if !field.optional {
                        missing.push(field.name.clone());
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(ParseError::MissingFields(missing));
        }

        Ok(coerce_outputs(signature, &raw, false))
    }

    fn set_reasoning(&mut self, enabled: bool) {
        self.reasoning = enabled;
    }

    fn adapter_name(&self) -> &'static str {
        "ChatAdapter"
    }
}

/// Finds every `[[ ## name ## ]]` marker (tolerating the `[[## x ##]]` and
/// `[[##x##]]` spacing variants) and the span of text up to the next marker or
/// end-of-text. Returns (name, value_start, value_end) triples in document order.
fn locate_markers(completion: &str) -> Vec<(String, usize, usize)> {
    let markers: Vec<(String, usize, usize)> = MARKER
        .captures_iter(completion)
        .map(|c| {
            let m = c.get(0).unwrap();
            (c[1].to_string(), m.start(), m.end())
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, (name, _, value_start))| {
            let value_end = markers
                .get(i + 1)
                .map(|(_, next_start, _)| *next_start)
                .unwrap_or(completion.len());
            (name.clone(), *value_start, value_end)
        })
        .collect()
}

/// For int/float kind, extracts the first numeric token; falling back to the
/// qualitative-term table. For class kind, reduces to the first non-empty token,
/// lowercased. Otherwise returns the text unchanged for `coerce_outputs` to handle.
fn interpret(field: &Field, text: &str) -> FieldValue {
    match field.kind {
        FieldKind::Class => {
            let token = text.split_whitespace().next().unwrap_or("").to_lowercase();
            FieldValue::String(token)
        }
        FieldKind::Int | FieldKind::Float => {
            if let Some(token) = first_numeric_token(text) {
                return FieldValue::String(token);
            }
            if let Some(mapped) = qualitative_to_numeric(text) {
                return FieldValue::Float(mapped);
            }
            FieldValue::String(text.to_string())
        }
        _ => FieldValue::String(text.to_string()),
    }
}

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(\.\d+)?%?").unwrap());

fn first_numeric_token(text: &str) -> Option<String> {
    NUMERIC_TOKEN.find(text).map(|m| m.as_str().to_string())
}

fn qualitative_to_numeric(text: &str) -> Option<f64> {
    let lower = text.trim().to_lowercase();
    match lower.as_str() {
        "very high" => Some(0.95),
        "high" => Some(0.9),
        "medium" | "moderate" => Some(0.7),
        "low" => Some(0.3),
        "very low" => Some(0.1),
        _ => None,
    }
}

/// Last-resort extraction when a required field's marker never appears (spec
/// §4.5, §9 "keep as a last-resort table").
fn heuristic_extract(completion: &str, field_name: &str) -> Option<String> {
    if field_name.eq_ignore_ascii_case("story") && completion.trim().len() >= 100 {
        return Some(completion.trim().to_string());
    }
    if field_name.eq_ignore_ascii_case("title") {
        if let Some(line) = completion.lines().find(|l| !l.trim().is_empty()) {
            return Some(line.trim().to_string());
        }
    }

    let lower = completion.to_lowercase();
    let is_react_style = ["thought:", "action:", "observation:"]
        .iter()
        .any(|m| lower.contains(m));
    if is_react_style && (field_name.eq_ignore_ascii_case("answer") || field_name.eq_ignore_ascii_case("result")) {
        if let Some(final_answer) = extract_final_answer(completion) {
            return Some(final_answer);
        }
    }

    let synonyms = field_synonyms(field_name);
    for candidate in std::iter::once(field_name).chain(synonyms.iter().copied()) {
        if let Some(value) = find_labeled_line(completion, candidate) {
            return Some(value);
        }
    }

    None
}

fn field_synonyms(field_name: &str) -> Vec<&'static str> {
    if field_name.eq_ignore_ascii_case("answer") {
        vec!["final answer", "result", "solution", "conclusion", "response"]
    } else {
        vec![]
    }
}

fn find_labeled_line(completion: &str, label: &str) -> Option<String> {
    let needle = format!("{}:", label.to_lowercase());
    for line in completion.lines() {
        let lower = line.to_lowercase();
        if let Some(pos) = lower.find(&needle) {
            let rest = &line[pos + needle.len()..];
            let trimmed = rest.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn extract_final_answer(completion: &str) -> Option<String> {
    let lower = completion.to_lowercase();
    let marker_pos = lower
        .find("final answer:")
        .or_else(|| lower.find("action: none (final answer)"))?;
    let after = &completion[marker_pos..];
    let after_colon = after.split_once(':').map(|(_, rest)| rest).unwrap_or(after);

    let mut collected = Vec::new();
    for line in after_colon.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if collected.is_empty() {
                continue;
            }
            break;
        }
        let lower_line = trimmed.to_lowercase();
        if ["thought:", "action:", "observation:"]
            .iter()
            .any(|m| lower_line.starts_with(m))
        {
            break;
        }
        collected.push(trimmed.to_string());
    }

    let joined = collected.join(" ").trim().to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
