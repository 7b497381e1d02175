//! A deterministic, in-memory [`Lm`] used by tests and examples — no network calls,
//! no nondeterminism.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::Error;
use crate::data::Message;
use crate::lm::{GenerateOptions, GenerateResult, Lm, StreamChunk, StreamError, Usage};

/// Replays a fixed queue of responses, one per call; once exhausted, echoes the
/// last user message back as the completion.
pub struct DummyLm {
    name: String,
    responses: Mutex<VecDeque<String>>,
}

impl DummyLm {
    pub fn new() -> Self {
        DummyLm {
            name: "dummy".to_string(),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_responses(responses: Vec<impl Into<String>>) -> Self {
        DummyLm {
            name: "dummy".to_string(),
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn next_response(&self, messages: &[Message]) -> String {
        let mut queue = self.responses.lock().unwrap();
        queue.pop_front().unwrap_or_else(|| {
            messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default()
        })
    }
}

impl Default for DummyLm {
    fn default() -> Self {
        DummyLm::new()
    }
}

#[async_trait]
impl Lm for DummyLm {
    async fn generate(
        &self,
        messages: &[Message],
        _options: &GenerateOptions,
    ) -> Result<GenerateResult, Error> {
        let content = self.next_response(messages);
        let prompt_tokens = messages.iter().map(|m| m.content.split_whitespace().count() as u32).sum();
        let completion_tokens = content.split_whitespace().count() as u32;
        Ok(GenerateResult {
            content,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, StreamError>>, Error> {
        let result = self.generate(messages, options).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(2);
        let _ = tx
            .send(Ok(StreamChunk {
                content: result.content,
                finish_reason: Some("stop".to_string()),
                usage: Some(result.usage),
                ..Default::default()
            }))
            .await;
        Ok(rx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_queued_responses_in_order() {
        let lm = DummyLm::with_responses(vec!["first", "second"]);
        let a = lm.generate(&[Message::user("q1")], &GenerateOptions::default()).await.unwrap();
        let b = lm.generate(&[Message::user("q2")], &GenerateOptions::default()).await.unwrap();
        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
    }

    #[tokio::test]
    async fn echoes_last_message_once_queue_is_exhausted() {
        let lm = DummyLm::new();
        let result = lm
            .generate(&[Message::user("echo me")], &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(result.content, "echo me");
    }

    #[tokio::test]
    async fn stream_synthesizes_a_single_terminal_chunk() {
        let lm = DummyLm::with_responses(vec!["hello"]);
        let mut rx = lm.stream(&[Message::user("hi")], &GenerateOptions::default()).await.unwrap();
        let chunk = rx.recv().await.unwrap().unwrap();
        assert_eq!(chunk.content, "hello");
        assert_eq!(chunk.finish_reason.as_deref(), Some("stop"));
    }
}
