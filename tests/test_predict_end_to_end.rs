//! Predict wired to a JsonAdapter and a DummyLm: validation, formatting, caching,
//! and output validation as one pipeline rather than in isolation.

use std::sync::Arc;

use llmrt::core::{Field, FieldKind, FieldMap, FieldValue, Signature};
use llmrt::{Cache, JsonAdapter, Predict};
use llmrt::providers::DummyLm;

fn qa_signature() -> Signature {
    Signature::new("answer a question about a passage")
        .with_input(Field::new("context", FieldKind::String, "background text"))
        .with_input(Field::new("question", FieldKind::String, "the question"))
        .with_output(Field::new("answer", FieldKind::String, "a short answer"))
}

#[tokio::test]
async fn end_to_end_call_returns_validated_prediction_with_usage() {
    let lm = Arc::new(DummyLm::with_responses(vec![r#"{"answer": "Paris"}"#]));
    let predict = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm);

    let mut inputs = FieldMap::new();
    inputs.insert(
        "context".to_string(),
        FieldValue::String("France's capital is Paris.".into()),
    );
    inputs.insert(
        "question".to_string(),
        FieldValue::String("What is the capital of France?".into()),
    );

    let prediction = predict.forward(inputs).await.unwrap();
    assert_eq!(
        prediction.outputs.get("answer"),
        Some(&FieldValue::String("Paris".into()))
    );
    assert_eq!(prediction.adapter_used.as_deref(), Some("JsonAdapter"));
    assert!(prediction.usage.total_tokens > 0);
}

#[tokio::test]
async fn missing_required_output_is_a_validation_error_even_through_the_cache() {
    let lm = Arc::new(DummyLm::with_responses(vec![r#"{"wrong_field": "x"}"#]));
    let predict = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm)
        .with_cache(Arc::new(Cache::default()));

    let mut inputs = FieldMap::new();
    inputs.insert("context".to_string(), FieldValue::String("c".into()));
    inputs.insert("question".to_string(), FieldValue::String("q".into()));

    let result = predict.forward(inputs).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn shared_cache_serves_a_second_distinct_predict_instance() {
    // P1/S6: fingerprinting is keyed on (model, messages, options), not on which
    // `Predict` instance issued the call.
    let cache = Arc::new(Cache::default());
    let lm = Arc::new(DummyLm::with_responses(vec![r#"{"answer": "first"}"#]));
    let first = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm.clone())
        .with_cache(cache.clone());

    let mut inputs = FieldMap::new();
    inputs.insert("context".to_string(), FieldValue::String("c".into()));
    inputs.insert("question".to_string(), FieldValue::String("q".into()));

    let _ = first.forward(inputs.clone()).await.unwrap();

    let second = Predict::new(qa_signature(), Arc::new(JsonAdapter::new()), lm).with_cache(cache);
    let prediction = second.forward(inputs).await.unwrap();
    assert_eq!(
        prediction.outputs.get("answer"),
        Some(&FieldValue::String("first".into()))
    );
}
