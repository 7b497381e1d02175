//! Driving `StreamBuffer` against chunks the way a caller consuming
//! `DummyLm::stream` would see them, then handing the finalized text to an adapter.

use std::sync::Arc;

use llmrt::providers::DummyLm;
use llmrt::streaming::StreamBuffer;
use llmrt::{ChatAdapter, Lm};

#[tokio::test]
async fn truncated_marker_mid_stream_is_recovered_before_parsing() {
    // S4: the stream is cut off mid-marker; StreamBuffer's finalize closes it so
    // ChatAdapter can still parse the field out.
    let lm = Arc::new(DummyLm::with_responses(vec![
        "[[ ## reasoning ## ]]\nbecause the sky scatters blue light\n\n[[ ## answer ##",
    ]));

    let mut receiver = lm
        .stream(&[llmrt::Message::user("why is the sky blue")], &llmrt::GenerateOptions::default())
        .await
        .unwrap();

    let mut buffer = StreamBuffer::new();
    while let Some(chunk) = receiver.recv().await {
        let chunk = chunk.unwrap();
        buffer.push(&chunk.content);
    }

    let (incomplete, name) = buffer.detect_incomplete_marker();
    assert!(incomplete);
    assert_eq!(name.as_deref(), Some("answer"));

    let finalized = buffer.finalize();
    assert!(finalized.ends_with("[[ ## answer ## ]]"));

    let adapter = ChatAdapter::new();
    let sig = llmrt::Signature::new("explain a phenomenon")
        .with_output(llmrt::Field::new(
            "reasoning",
            llmrt::FieldKind::String,
            "",
        ))
        .with_output(llmrt::Field::new("answer", llmrt::FieldKind::String, ""));

    // finalize only closes the marker syntax, it doesn't fabricate a body for it:
    // `answer` parses as present but empty, `reasoning` carries the real content.
    let outputs = adapter.parse(&sig, &finalized).await.unwrap();
    assert_eq!(
        outputs.get("reasoning"),
        Some(&llmrt::FieldValue::String(
            "because the sky scatters blue light".to_string()
        ))
    );
    assert_eq!(
        outputs.get("answer"),
        Some(&llmrt::FieldValue::String(String::new()))
    );
}
