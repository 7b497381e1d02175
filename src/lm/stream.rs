//! Streaming chunk/error types (spec §4.6).

use serde::{Deserialize, Serialize};

use super::Usage;
use crate::tools::ToolCallDelta;

/// One increment of a streamed completion. The stream closes cleanly after the
/// final chunk; a parallel error channel (modeled here as `Result::Err`) is
/// buffered for at most one terminal error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    pub content: String,
    pub tool_call_deltas: Vec<ToolCallDelta>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    #[error("stream cancelled")]
    Cancelled,
    #[error("provider error: {0}")]
    Provider(String),
}
