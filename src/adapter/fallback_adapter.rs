//! FallbackAdapter (spec §4.5): tries each inner adapter in order, returning the
//! first successful parse with provenance of which adapter won.

use async_trait::async_trait;

use super::{Adapter, ChatAdapter, JsonAdapter};
use crate::core::{AdapterFailure, Example, FieldMap, FieldValue, ParseError, Signature};
use crate::data::Message;

pub struct FallbackAdapter {
    adapters: Vec<Box<dyn Adapter>>,
}

impl Default for FallbackAdapter {
    fn default() -> Self {
        FallbackAdapter {
            adapters: vec![Box::new(ChatAdapter::new()), Box::new(JsonAdapter::new())],
        }
    }
}

impl FallbackAdapter {
    pub fn new(adapters: Vec<Box<dyn Adapter>>) -> Self {
        FallbackAdapter { adapters }
    }
}

#[async_trait]
impl Adapter for FallbackAdapter {
    /// Delegates entirely to the first adapter in the chain.
    fn format(&self, signature: &Signature, inputs: &FieldMap, demos: &[Example]) -> Vec<Message> {
        self.adapters[0].format(signature, inputs, demos)
    }

    async fn parse(&self, signature: &Signature, completion: &str) -> Result<FieldMap, ParseError> {
        let mut failures = Vec::new();

        for (index, adapter) in self.adapters.iter().enumerate() {
            match adapter.parse(signature, completion).await {
                Ok(mut outputs) => {
                    outputs.insert(
                        "__adapter_used".to_string(),
                        FieldValue::String(adapter.adapter_name().to_string()),
                    );
                    outputs.insert(
                        "__parse_attempts".to_string(),
                        FieldValue::Int((index + 1) as i64),
                    );
                    outputs.insert(
                        "__fallback_used".to_string(),
                        FieldValue::Bool(index > 0),
                    );
                    return Ok(outputs);
                }
                Err(e) => failures.push(AdapterFailure {
                    adapter: adapter.adapter_name().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        let summary = failures
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ParseError::FallbackExhausted(summary))
    }

    fn set_reasoning(&mut self, enabled: bool) {
        for adapter in &mut self.adapters {
            adapter.set_reasoning(enabled);
        }
    }

    fn adapter_name(&self) -> &'static str {
        "FallbackAdapter"
    }
}
