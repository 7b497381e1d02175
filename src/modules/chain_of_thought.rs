//! ChainOfThought: `Predict` with a leading `reasoning` output field and the
//! adapter's reasoning preamble enabled.

use std::sync::Arc;

use crate::adapter::Adapter;
use crate::core::{Error, Example, Field, FieldKind, FieldMap, Signature};
use crate::data::Prediction;
use crate::lm::Lm;

use super::Predict;

fn with_reasoning_field(signature: Signature) -> Signature {
    let reasoning = Field::new(
        "reasoning",
        FieldKind::String,
        "step-by-step reasoning leading to the final answer",
    );
    let mut augmented = Signature::new(signature.description.clone()).with_output(reasoning);
    for field in signature.inputs() {
        augmented = augmented.with_input(field.clone());
    }
    for field in signature.outputs() {
        augmented = augmented.with_output(field.clone());
    }
    augmented
}

pub struct ChainOfThought {
    inner: Predict,
}

impl ChainOfThought {
    pub fn new(signature: Signature, mut adapter: Arc<dyn Adapter>, lm: Arc<dyn Lm>) -> Self {
        let augmented = with_reasoning_field(signature);
        if let Some(adapter_mut) = Arc::get_mut(&mut adapter) {
            adapter_mut.set_reasoning(true);
        }
        ChainOfThought {
            inner: Predict::new(augmented, adapter, lm),
        }
    }

    pub fn with_demos(mut self, demos: Vec<Example>) -> Self {
        self.inner = self.inner.with_demos(demos);
        self
    }

    pub async fn forward(&self, inputs: FieldMap) -> Result<Prediction, Error> {
        let mut prediction = self.inner.forward(inputs).await?;
        prediction.rationale = prediction
            .outputs
            .get("reasoning")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        prediction.module_name = Some("ChainOfThought".to_string());
        Ok(prediction)
    }
}
