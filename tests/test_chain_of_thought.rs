//! ChainOfThought augmenting a signature with a `reasoning` field and turning the
//! adapter's reasoning preamble on, through a JsonAdapter and a ChatAdapter.

use std::sync::Arc;

use llmrt::core::{Field, FieldKind, FieldMap, FieldValue, Signature};
use llmrt::providers::DummyLm;
use llmrt::{ChainOfThought, ChatAdapter, JsonAdapter};

fn math_signature() -> Signature {
    Signature::new("solve a word problem")
        .with_input(Field::new("problem", FieldKind::String, ""))
        .with_output(Field::new("answer", FieldKind::String, ""))
}

#[tokio::test]
async fn json_adapter_chain_of_thought_exposes_rationale_and_answer() {
    let lm = Arc::new(DummyLm::with_responses(vec![
        r#"{"reasoning": "3 apples plus 4 apples is 7", "answer": "7"}"#,
    ]));
    let cot = ChainOfThought::new(math_signature(), Arc::new(JsonAdapter::new()), lm);

    let mut inputs = FieldMap::new();
    inputs.insert(
        "problem".to_string(),
        FieldValue::String("3 apples plus 4 apples".into()),
    );

    let prediction = cot.forward(inputs).await.unwrap();
    assert_eq!(
        prediction.rationale.as_deref(),
        Some("3 apples plus 4 apples is 7")
    );
    assert_eq!(
        prediction.outputs.get("answer"),
        Some(&FieldValue::String("7".into()))
    );
}

#[tokio::test]
async fn chat_adapter_chain_of_thought_parses_marker_based_reasoning() {
    let lm = Arc::new(DummyLm::with_responses(vec![
        "[[ ## reasoning ## ]]\nadding the two counts together\n\n[[ ## answer ## ]]\n7",
    ]));
    let cot = ChainOfThought::new(math_signature(), Arc::new(ChatAdapter::new()), lm);

    let mut inputs = FieldMap::new();
    inputs.insert("problem".to_string(), FieldValue::String("3 + 4".into()));

    let prediction = cot.forward(inputs).await.unwrap();
    assert_eq!(
        prediction.rationale.as_deref(),
        Some("adding the two counts together")
    );
    assert_eq!(
        prediction.outputs.get("answer"),
        Some(&FieldValue::String("7".into()))
    );
}
