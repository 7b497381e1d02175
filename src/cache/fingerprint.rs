//! Canonical request fingerprinting (spec §4.7): an order-insensitive, recursively
//! sorted-key serialization of `(model, messages, options)`, hashed with SHA-256.

use sha2::{Digest, Sha256};

use crate::data::{Message, Role};
use crate::lm::GenerateOptions;

/// Builds the canonical fingerprint for a request. Falls back to
/// `"{model}:{msg_count}"` if the request can't be serialized (I5) — in practice
/// this crate's types always serialize, but tool-call arguments are
/// caller-supplied `serde_json::Value`s and are not guaranteed representable.
pub fn cache_key(model: &str, messages: &[Message], options: &GenerateOptions) -> String {
    let record = build_record(model, messages, options);
    let canonical = canonicalize(&record);
    match serde_json::to_string(&canonical) {
        Ok(serialized) => hex_sha256(&serialized),
        Err(_) => fallback_key(model, messages),
    }
}

fn fallback_key(model: &str, messages: &[Message]) -> String {
    format!("{model}:{}", messages.len())
}

fn hex_sha256(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

fn build_record(model: &str, messages: &[Message], options: &GenerateOptions) -> serde_json::Value {
    let message_values: Vec<serde_json::Value> = messages.iter().map(message_value).collect();

    let mut stop = options.stop.clone();
    stop.sort();

    let mut tool_values: Vec<serde_json::Value> = options
        .tools
        .iter()
        .map(|tool| {
            let parameters: Vec<serde_json::Value> = tool
                .parameters
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name,
                        "kind": p.kind.to_string(),
                        "description": p.description,
                        "required": p.required,
                        "enum": p.enum_values,
                    })
                })
                .collect();
            serde_json::json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": parameters,
            })
        })
        .collect();
    // Tools sorted by name; each tool's own parameter order is preserved.
    tool_values.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    let tool_choice = options.tool_choice.as_ref().map(|tc| match tc {
        crate::lm::ToolChoice::Auto => serde_json::json!("auto"),
        crate::lm::ToolChoice::None => serde_json::json!("none"),
        crate::lm::ToolChoice::Named(name) => serde_json::json!(name),
    });

    serde_json::json!({
        "model": model,
        "messages": message_values,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
        "top_p": options.top_p,
        "response_format": options.response_format,
        "response_schema": options.response_schema,
        "stop": stop,
        "tools": tool_values,
        "tool_choice": tool_choice,
        "frequency_penalty": options.frequency_penalty,
        "presence_penalty": options.presence_penalty,
    })
}

fn message_value(message: &Message) -> serde_json::Value {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let tool_calls: Option<Vec<serde_json::Value>> = message.tool_calls.as_ref().map(|calls| {
        calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "name": tc.name,
                    "arguments": canonicalize(&tc.arguments),
                })
            })
            .collect()
    });

    serde_json::json!({
        "role": role,
        "content": message.content,
        "tool_calls": tool_calls,
    })
}

/// Recursively sorts object keys so that two structurally-equal-but-differently-
/// ordered JSON values serialize identically (spec invariant I2).
fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            let mut sorted = serde_json::Map::new();
            for (k, v) in entries {
                sorted.insert(k.clone(), canonicalize(v));
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}
