//! TwoStepAdapter (spec §4.5): lets a reasoning-tuned model answer in free form,
//! then delegates structured extraction to a second, cheaper, constrained model.
//!
//! Rationale carried over from the source design: reasoning models degrade under
//! structured-output constraints, so stage 1 never demands JSON.

use std::sync::Arc;

use async_trait::async_trait;

use super::json_adapter::JsonAdapter;
use super::Adapter;
use crate::core::{ConfigurationError, Example, FieldMap, ParseError, Signature};
use crate::data::Message;
use crate::lm::{GenerateOptions, Lm};

pub struct TwoStepAdapter {
    extraction_lm: Option<Arc<dyn Lm>>,
    json_adapter: JsonAdapter,
}

impl Default for TwoStepAdapter {
    fn default() -> Self {
        TwoStepAdapter {
            extraction_lm: None,
            json_adapter: JsonAdapter::new(),
        }
    }
}

impl TwoStepAdapter {
    pub fn new(extraction_lm: Arc<dyn Lm>) -> Self {
        TwoStepAdapter {
            extraction_lm: Some(extraction_lm),
            json_adapter: JsonAdapter::new(),
        }
    }

    fn extraction_prompt(signature: &Signature, stage1_response: &str) -> String {
        let field_names: Vec<&str> = signature.outputs().iter().map(|f| f.name.as_str()).collect();
        format!(
            "The following is a natural-language response to a task:\n\n\"{stage1_response}\"\n\n\
             Extract a single JSON object with exactly these fields: {}.",
            field_names.join(", ")
        )
    }
}

#[async_trait]
impl Adapter for TwoStepAdapter {
    /// Stage 1: a free-form prompt naming inputs and desired output fields as
    /// guidance, with no JSON demand.
    fn format(&self, signature: &Signature, inputs: &FieldMap, demos: &[Example]) -> Vec<Message> {
        let mut messages = Vec::new();
        messages.push(Message::system(signature.description.clone()));

        for demo in demos {
            let mut user = String::new();
            for field in signature.inputs() {
                if let Some(v) = demo.input.get(&field.name) {
                    user.push_str(&format!("{}: {}\n", field.name, v.to_json()));
                }
            }
            messages.push(Message::user(user));
            let narrative = demo
                .output
                .values()
                .map(|v| v.to_json().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            messages.push(Message::assistant(narrative));
        }

        let mut user = String::new();
        for field in signature.inputs() {
            if let Some(v) = inputs.get(&field.name) {
                user.push_str(&format!("{}: {}\n", field.name, v.to_json()));
            }
        }
        let output_names: Vec<&str> = signature.outputs().iter().map(|f| f.name.as_str()).collect();
        user.push_str(&format!(
            "\nRespond naturally; cover: {}.",
            output_names.join(", ")
        ));
        messages.push(Message::user(user));

        messages
    }

    /// Stage 2: ask the extraction LM for a typed JSON object quoting the stage-1
    /// response, then parse it via the JSON path.
    async fn parse(&self, signature: &Signature, completion: &str) -> Result<FieldMap, ParseError> {
        let Some(extraction_lm) = &self.extraction_lm else {
            return Err(ParseError::AdapterFailed {
                adapter: "TwoStepAdapter".to_string(),
                reason: ConfigurationError::MissingExtractionLm.to_string(),
            });
        };

        let prompt = Self::extraction_prompt(signature, completion);
        let messages = vec![Message::user(prompt)];
        let options = GenerateOptions::default().with_response_format(crate::lm::ResponseFormat::Json);

        let result = extraction_lm
            .generate(&messages, &options)
            .await
            .map_err(|e| ParseError::AdapterFailed {
                adapter: "TwoStepAdapter".to_string(),
                reason: e.to_string(),
            })?;

        self.json_adapter.parse(signature, &result.content).await
    }

    fn adapter_name(&self) -> &'static str {
        "TwoStepAdapter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, FieldKind, FieldValue};
    use crate::lm::{GenerateResult, StreamChunk, StreamError};

    struct StubLm {
        response: String,
    }

    #[async_trait]
    impl Lm for StubLm {
        async fn generate(
            &self,
            _messages: &[Message],
            _options: &GenerateOptions,
        ) -> Result<GenerateResult, crate::core::Error> {
            Ok(GenerateResult {
                content: self.response.clone(),
                ..Default::default()
            })
        }

        async fn stream(
            &self,
            _messages: &[Message],
            _options: &GenerateOptions,
        ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, StreamError>>, crate::core::Error>
        {
            let (_tx, rx) = tokio::sync::mpsc::channel(1);
            Ok(rx)
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn sig() -> Signature {
        Signature::new("").with_output(Field::new("answer", FieldKind::String, ""))
    }

    #[tokio::test]
    async fn parses_via_extraction_lm() {
        let extraction_lm = Arc::new(StubLm {
            response: r#"{"answer": "42"}"#.to_string(),
        });
        let adapter = TwoStepAdapter::new(extraction_lm);
        let outputs = adapter.parse(&sig(), "the answer is obviously 42").await.unwrap();
        assert_eq!(outputs.get("answer"), Some(&FieldValue::String("42".into())));
    }

    #[tokio::test]
    async fn missing_extraction_lm_is_a_configuration_failure() {
        let adapter = TwoStepAdapter::default();
        let result = adapter.parse(&sig(), "anything").await;
        assert!(matches!(result, Err(ParseError::AdapterFailed { .. })));
    }
}
