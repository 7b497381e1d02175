//! FallbackAdapter wired through Predict, against a DummyLm that emits completions
//! only the second adapter in the chain (plus JSON repair) can make sense of.

use std::sync::Arc;

use llmrt::core::{Field, FieldKind, FieldMap, FieldValue, Signature};
use llmrt::providers::DummyLm;
use llmrt::{FallbackAdapter, Predict};

fn sig() -> Signature {
    Signature::new("extract a name and a class")
        .with_input(Field::new("text", FieldKind::String, ""))
        .with_output(Field::new("answer", FieldKind::String, ""))
}

#[tokio::test]
async fn falls_back_to_json_and_reports_provenance() {
    // S3: no `[[ ## answer ## ]]` marker anywhere, so ChatAdapter fails and
    // FallbackAdapter moves on to JsonAdapter.
    let lm = Arc::new(DummyLm::with_responses(vec![r#"{"answer": "Ada Lovelace"}"#]));
    let predict = Predict::new(sig(), Arc::new(FallbackAdapter::default()), lm);

    let mut inputs = FieldMap::new();
    inputs.insert("text".to_string(), FieldValue::String("who wrote the notes".into()));

    let prediction = predict.forward(inputs).await.unwrap();
    assert_eq!(
        prediction.outputs.get("answer"),
        Some(&FieldValue::String("Ada Lovelace".into()))
    );
    assert_eq!(prediction.adapter_used.as_deref(), Some("JsonAdapter"));
    assert!(prediction.fallback_used);
    assert_eq!(prediction.parse_attempts, 2);
}

#[tokio::test]
async fn dirty_json_is_repaired_transparently_through_the_fallback_chain() {
    // P4: single quotes and a trailing comma, still parsed once repaired, and the
    // repair marker never leaks into the final validated output map.
    let lm = Arc::new(DummyLm::with_responses(vec!["{answer: 'Grace Hopper',}"]));
    let predict = Predict::new(sig(), Arc::new(FallbackAdapter::default()), lm);

    let mut inputs = FieldMap::new();
    inputs.insert("text".to_string(), FieldValue::String("who wrote COBOL tooling".into()));

    let prediction = predict.forward(inputs).await.unwrap();
    assert_eq!(
        prediction.outputs.get("answer"),
        Some(&FieldValue::String("Grace Hopper".into()))
    );
    assert!(prediction.outputs.get("__json_repair").is_none());
}

#[tokio::test]
async fn exhausting_every_adapter_surfaces_as_a_parse_error() {
    let lm = Arc::new(DummyLm::with_responses(vec!["nothing structured at all"]));
    let predict = Predict::new(sig(), Arc::new(FallbackAdapter::default()), lm);

    let mut inputs = FieldMap::new();
    inputs.insert("text".to_string(), FieldValue::String("x".into()));

    let result = predict.forward(inputs).await;
    assert!(matches!(result, Err(llmrt::Error::Parse(_))));
}
