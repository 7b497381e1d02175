//! JSONAdapter (spec §4.5): demands a single JSON object as the completion.

use async_trait::async_trait;

use super::coerce::coerce_outputs;
use super::Adapter;
use crate::core::{Example, Field, FieldKind, FieldMap, FieldValue, ParseError, Signature};
use crate::data::Message;
use crate::json::extract_and_parse;

#[derive(Default, Clone)]
pub struct JsonAdapter {
    reasoning: bool,
}

impl JsonAdapter {
    pub fn new() -> Self {
        JsonAdapter::default()
    }

    fn output_line(field: &Field) -> String {
        let mut line = format!("{} ({})", field.name, field.kind);
        if field.optional {
            line.push_str("[optional]");
        }
        if field.kind == FieldKind::Class {
            line.push_str(&format!("[{}]", field.permitted_values().join("|")));
        }
        if !field.description.is_empty() {
            line.push_str(&format!(": {}", field.description));
        }
        line
    }

    fn demo_as_user_turn(&self, signature: &Signature, demo: &Example) -> Vec<Message> {
        let mut input_lines = String::new();
        for field in signature.inputs() {
            if let Some(v) = demo.input.get(&field.name) {
                input_lines.push_str(&format!("{}: {}\n", field.name, render_value(v)));
            }
        }
        let expected = FieldValue::Json(serde_json::Value::Object(
            demo.output
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        ));
        vec![
            Message::user(format!("--- Inputs ---\n{input_lines}")),
            Message::assistant(expected.to_json().to_string()),
        ]
    }
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

#[async_trait]
impl Adapter for JsonAdapter {
    fn format(&self, signature: &Signature, inputs: &FieldMap, demos: &[Example]) -> Vec<Message> {
        let mut messages = Vec::new();

        let mut system = signature.description.clone();
        if self.reasoning {
            system.push_str(
                "\n\nThink step by step before producing the JSON object, but include \
                 that reasoning only in a `rationale` field, never outside the object.",
            );
        }
        system.push_str("\n\n--- Required Output Format ---\n");
        for field in signature.outputs() {
            system.push_str(&Self::output_line(field));
            system.push('\n');
        }
        system.push_str("\nRespond with a single valid JSON object and nothing else.");
        messages.push(Message::system(system));

        for demo in demos {
            messages.extend(self.demo_as_user_turn(signature, demo));
        }

        let mut input_lines = String::new();
        for field in signature.inputs() {
            if let Some(v) = inputs.get(&field.name) {
                input_lines.push_str(&format!("{}: {}\n", field.name, render_value(v)));
            }
        }
        messages.push(Message::user(format!("--- Inputs ---\n{input_lines}")));

        messages
    }

    async fn parse(&self, signature: &Signature, completion: &str) -> Result<FieldMap, ParseError> {
        let parsed = extract_and_parse(completion)?;
        let serde_json::Value::Object(map) = parsed.value else {
            return Err(ParseError::ExtractionNotObject);
        };

        let mut raw = FieldMap::new();
        for (key, value) in map {
            raw.insert(key, FieldValue::from_json(value));
        }
        if parsed.repaired {
            raw.insert("__json_repair".to_string(), FieldValue::Bool(true));
        }

        let coerced = coerce_outputs(signature, &raw, true);

        let missing: Vec<String> = signature
            .outputs()
            .iter()
            .filter(|f| !f.optional)
            .filter(|f| !coerced.get(&f.name).is_some_and(|v| !v.is_null()))
            .map(|f| f.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingFields(missing));
        }

        Ok(coerced)
    }

    fn set_reasoning(&mut self, enabled: bool) {
        self.reasoning = enabled;
    }

    fn adapter_name(&self) -> &'static str {
        "JsonAdapter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldKind;

    fn sig() -> Signature {
        Signature::new("answer a question")
            .with_input(Field::new("question", FieldKind::String, ""))
            .with_output(Field::new("answer", FieldKind::String, ""))
    }

    #[tokio::test]
    async fn parses_clean_json_completion() {
        let adapter = JsonAdapter::new();
        let outputs = adapter.parse(&sig(), r#"{"answer": "42"}"#).await.unwrap();
        assert_eq!(outputs.get("answer"), Some(&FieldValue::String("42".into())));
    }

    #[tokio::test]
    async fn parses_and_flags_repaired_json() {
        let adapter = JsonAdapter::new();
        let outputs = adapter.parse(&sig(), "{answer: '42',}").await.unwrap();
        assert_eq!(outputs.get("answer"), Some(&FieldValue::String("42".into())));
        assert_eq!(outputs.get("__json_repair"), Some(&FieldValue::Bool(true)));
    }

    #[tokio::test]
    async fn missing_required_field_is_a_parse_error() {
        let adapter = JsonAdapter::new();
        let result = adapter.parse(&sig(), r#"{"something_else": 1}"#).await;
        assert!(matches!(result, Err(ParseError::MissingFields(_))));
    }

    #[test]
    fn format_includes_required_output_section() {
        let adapter = JsonAdapter::new();
        let mut inputs = FieldMap::new();
        inputs.insert("question".into(), FieldValue::String("what time is it".into()));
        let messages = adapter.format(&sig(), &inputs, &[]);
        let system = &messages[0].content;
        assert!(system.contains("--- Required Output Format ---"));
        assert!(system.contains("answer (string)"));
    }
}
