//! Recognized generation options (spec §3 `GenerateOptions`).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::tools::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    None,
    Named(String),
}

/// `Clone` produces a deep copy of every owned slice/map field; `stream_callback`,
/// being pointer-valued, is shared (an `Arc` clone) rather than duplicated.
#[derive(Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    /// Order is insensitive for cache-key purposes (spec invariant I3).
    pub stop: Vec<String>,
    pub response_format: Option<ResponseFormat>,
    pub response_schema: Option<serde_json::Value>,
    pub tools: Vec<Tool>,
    pub tool_choice: Option<ToolChoice>,
    pub stream: bool,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    #[allow(clippy::type_complexity)]
    pub stream_callback: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl std::fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("stop", &self.stop)
            .field("response_format", &self.response_format)
            .field("response_schema", &self.response_schema)
            .field("tools", &self.tools)
            .field("tool_choice", &self.tool_choice)
            .field("stream", &self.stream)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("presence_penalty", &self.presence_penalty)
            .field("stream_callback", &self.stream_callback.is_some())
            .finish()
    }
}

impl GenerateOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}
