//! The LM contract (C6): an abstract interface for synchronous generation and
//! streaming, implemented by providers and by [`crate::observability::ObservabilityWrapper`].

mod options;
mod stream;

pub use options::{GenerateOptions, ResponseFormat, ToolChoice};
pub use stream::{StreamChunk, StreamError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::Error;
use crate::data::Message;
use crate::tools::ToolCall;

/// Token/cost/latency accounting for one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub cost: f64,
    pub latency_ms: u64,
}

/// The result of one `generate` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResult {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
    /// Request id, rate limits, cache-status hints — provider-specific.
    pub provider_metadata: HashMap<String, serde_json::Value>,
}

/// Abstract interface any LM provider (or wrapper) implements.
///
/// Cancellation is expressed through the async runtime's own cancellation (dropping
/// the future, or a `tokio_util::sync::CancellationToken` threaded through
/// `options.stream_callback`-style hooks by the caller) rather than an ad hoc flag.
#[async_trait]
pub trait Lm: Send + Sync {
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<GenerateResult, Error>;

    /// Streams a completion. Returns a channel of content/tool-call/finish-reason/
    /// usage chunks; closes cleanly on completion. Implementations that don't
    /// support streaming may synthesize a single chunk from `generate`.
    async fn stream(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, StreamError>>, Error>;

    fn name(&self) -> &str;

    fn supports_json(&self) -> bool {
        true
    }

    fn supports_tools(&self) -> bool {
        false
    }
}
