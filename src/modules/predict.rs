//! Predict: validate inputs, format a prompt, call an [`Lm`] (through an optional
//! [`Cache`]), parse and validate the completion, return a [`Prediction`].

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::adapter::Adapter;
use crate::cache::Cache;
use crate::core::{validate_inputs, validate_outputs, Error, Example, FieldMap, Signature};
use crate::data::Prediction;
use crate::lm::{GenerateOptions, Lm};

/// Orchestrates one `Signature` call: `Predict` owns no state across calls other
/// than its configured demos — every `forward` is independent.
pub struct Predict {
    signature: Signature,
    adapter: Arc<dyn Adapter>,
    lm: Arc<dyn Lm>,
    demos: Vec<Example>,
    options: GenerateOptions,
    cache: Option<Arc<Cache>>,
}

impl Predict {
    pub fn new(signature: Signature, adapter: Arc<dyn Adapter>, lm: Arc<dyn Lm>) -> Self {
        Predict {
            signature,
            adapter,
            lm,
            demos: Vec::new(),
            options: GenerateOptions::default(),
            cache: None,
        }
    }

    pub fn with_demos(mut self, demos: Vec<Example>) -> Self {
        self.demos = demos;
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[instrument(name = "predict.forward", skip(self, inputs), fields(fields = inputs.len()))]
    pub async fn forward(&self, inputs: FieldMap) -> Result<Prediction, Error> {
        validate_inputs(&self.signature, &inputs)?;

        let messages = self.adapter.format(&self.signature, &inputs, &self.demos);

        let cached = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(self.lm.name(), &messages, &self.options));

        let result = match cached {
            Some(result) => {
                debug!("cache hit");
                result
            }
            None => {
                let result = self.lm.generate(&messages, &self.options).await?;
                if let Some(cache) = &self.cache {
                    cache.set(self.lm.name(), &messages, &self.options, result.clone());
                }
                result
            }
        };

        let mut outputs = self.adapter.parse(&self.signature, &result.content).await?;

        let adapter_used = outputs
            .shift_remove("__adapter_used")
            .and_then(|v| v.as_str().map(str::to_string));
        let parse_attempts = outputs
            .shift_remove("__parse_attempts")
            .and_then(|v| v.as_i64())
            .unwrap_or(1) as usize;
        let fallback_used = outputs
            .shift_remove("__fallback_used")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        outputs.shift_remove("__json_repair");

        validate_outputs(&self.signature, &outputs)?;

        let mut prediction = Prediction::new(outputs);
        prediction.usage = result.usage;
        prediction.module_name = Some("Predict".to_string());
        prediction.inputs = inputs;
        prediction.adapter_used = adapter_used.or_else(|| Some(self.adapter.adapter_name().to_string()));
        prediction.parse_attempts = parse_attempts.max(1);
        prediction.fallback_used = fallback_used;
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::JsonAdapter;
    use crate::core::{Field, FieldKind, FieldValue};
    use crate::providers::DummyLm;

    fn qa_signature() -> Signature {
        Signature::new("answer a question")
            .with_input(Field::new("question", FieldKind::String, ""))
            .with_output(Field::new("answer", FieldKind::String, ""))
    }

    #[tokio::test]
    async fn forward_validates_parses_and_returns_usage() {
        let lm = Arc::new(DummyLm::with_responses(vec![r#"{"answer": "42"}"#]));
        let predict = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm);

        let mut inputs = FieldMap::new();
        inputs.insert("question".to_string(), FieldValue::String("what is it".into()));

        let prediction = predict.forward(inputs).await.unwrap();
        assert_eq!(
            prediction.outputs.get("answer"),
            Some(&FieldValue::String("42".into()))
        );
        assert_eq!(prediction.adapter_used.as_deref(), Some("JsonAdapter"));
    }

    #[tokio::test]
    async fn forward_rejects_missing_required_input() {
        let lm = Arc::new(DummyLm::with_responses(vec![r#"{"answer": "42"}"#]));
        let predict = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm);
        let result = predict.forward(FieldMap::new()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn forward_uses_cache_on_second_identical_call() {
        let lm = Arc::new(DummyLm::with_responses(vec![
            r#"{"answer": "first"}"#,
            r#"{"answer": "second"}"#,
        ]));
        let cache = Arc::new(Cache::default());
        let predict = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm).with_cache(cache);

        let mut inputs = FieldMap::new();
        inputs.insert("question".to_string(), FieldValue::String("q".into()));

        let first = predict.forward(inputs.clone()).await.unwrap();
        let second = predict.forward(inputs).await.unwrap();
        assert_eq!(first.outputs.get("answer"), second.outputs.get("answer"));
        assert_eq!(
            second.outputs.get("answer"),
            Some(&FieldValue::String("first".into()))
        );
    }
}
