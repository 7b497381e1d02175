//! Observability Wrapper (C8): decorates any [`Lm`] with cost/latency accounting and
//! a [`HistoryEntry`] submitted to a pluggable [`Collector`].

mod collector;

pub use collector::{Collector, CompositeCollector, JsonlFileCollector, RingBufferCollector};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Error;
use crate::data::Message;
use crate::lm::{GenerateOptions, GenerateResult, Lm, StreamChunk, StreamError};

/// A cost model: `(model, prompt_tokens, completion_tokens) -> cost`. The default
/// charges nothing — callers wire in real pricing via [`ObservabilityWrapper::with_cost_fn`].
pub type CostFn = Arc<dyn Fn(&str, u32, u32) -> f64 + Send + Sync>;

fn zero_cost(_model: &str, _prompt_tokens: u32, _completion_tokens: u32) -> f64 {
    0.0
}

/// Request-side metadata recorded for one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub prompt_length: usize,
    pub has_tools: bool,
}

/// Response-side metadata recorded for one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub content_length: usize,
    pub tool_call_count: usize,
    pub finish_reason: Option<String>,
}

/// Cache-hit metadata, inferred from provider metadata (spec §4.8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub hit: bool,
    pub source: Option<String>,
}

/// Error metadata recorded when a call fails; the caller still sees the original
/// error (spec §7) — this is only the observability record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorMetadata {
    pub message: String,
    pub kind: String,
}

/// One observability record per call (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<String>,
    pub provider: String,
    pub model: String,
    pub request: RequestMetadata,
    pub response: ResponseMetadata,
    pub usage: crate::lm::Usage,
    pub cache: CacheMetadata,
    pub provider_metadata: HashMap<String, serde_json::Value>,
    pub error: Option<ErrorMetadata>,
}

/// Infers a provider name from a model identifier when no explicit default is
/// configured (spec §4.8).
pub fn infer_provider(model: &str) -> String {
    let lower = model.to_lowercase();
    if lower.contains("gpt") || lower.contains("openai") {
        "openai".to_string()
    } else if lower.contains("claude") || lower.contains("anthropic") {
        "anthropic".to_string()
    } else if lower.contains("gemini") || lower.contains("google") {
        "google".to_string()
    } else if lower.contains("llama") || lower.contains("meta") {
        "meta".to_string()
    } else {
        "unknown".to_string()
    }
}

/// Wraps any [`Lm`], recording a [`HistoryEntry`] per call. Never converts a
/// caller-visible error into its own — it records and re-raises (spec §7).
pub struct ObservabilityWrapper {
    inner: Arc<dyn Lm>,
    collector: Option<Arc<dyn Collector>>,
    provider: Option<String>,
    cost_fn: CostFn,
    session_id: Option<String>,
}

impl ObservabilityWrapper {
    pub fn new(inner: Arc<dyn Lm>) -> Self {
        ObservabilityWrapper {
            inner,
            collector: None,
            provider: None,
            cost_fn: Arc::new(zero_cost),
            session_id: None,
        }
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_cost_fn(mut self, cost_fn: CostFn) -> Self {
        self.cost_fn = cost_fn;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    fn provider_name(&self) -> String {
        self.provider
            .clone()
            .unwrap_or_else(|| infer_provider(self.inner.name()))
    }

    fn cache_metadata(metadata: &HashMap<String, serde_json::Value>) -> CacheMetadata {
        let hit = match metadata.get("cache_status") {
            Some(serde_json::Value::String(s)) if s == "hit" => true,
            _ => matches!(metadata.get("cache_hit"), Some(serde_json::Value::Bool(true))),
        };
        let source = metadata
            .get("cache_status")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        CacheMetadata { hit, source }
    }

    async fn submit(&self, entry: HistoryEntry) {
        if let Some(collector) = &self.collector {
            let _ = collector.submit(entry).await;
        }
    }

    fn base_entry(&self, messages: &[Message], options: &GenerateOptions) -> HistoryEntry {
        HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            session_id: self.session_id.clone(),
            provider: self.provider_name(),
            model: self.inner.name().to_string(),
            request: RequestMetadata {
                prompt_length: messages.iter().map(|m| m.content.len()).sum(),
                has_tools: !options.tools.is_empty(),
            },
            ..Default::default()
        }
    }
}

#[async_trait]
impl Lm for ObservabilityWrapper {
    async fn generate(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<GenerateResult, Error> {
        let start = Instant::now();
        let mut entry = self.base_entry(messages, options);

        match self.inner.generate(messages, options).await {
            Ok(mut result) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let cost = (self.cost_fn)(
                    &entry.model,
                    result.usage.prompt_tokens,
                    result.usage.completion_tokens,
                );
                result.usage.latency_ms = latency_ms;
                result.usage.cost = cost;

                entry.response = ResponseMetadata {
                    content_length: result.content.len(),
                    tool_call_count: result.tool_calls.len(),
                    finish_reason: result.finish_reason.clone(),
                };
                entry.usage = result.usage.clone();
                entry.cache = Self::cache_metadata(&result.provider_metadata);
                entry.provider_metadata = result.provider_metadata.clone();

                self.submit(entry).await;
                Ok(result)
            }
            Err(e) => {
                entry.usage.latency_ms = start.elapsed().as_millis() as u64;
                entry.error = Some(ErrorMetadata {
                    message: e.to_string(),
                    kind: "generation_error".to_string(),
                });
                self.submit(entry).await;
                Err(e)
            }
        }
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, StreamError>>, Error> {
        let start = Instant::now();
        let entry_base = self.base_entry(messages, options);
        let mut inner_rx = self.inner.stream(messages, options).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(16);
        let collector = self.collector.clone();
        let model = entry_base.model.clone();
        let cost_fn = self.cost_fn.clone();

        tokio::spawn(async move {
            let mut content = String::new();
            let mut tool_calls = Vec::new();
            let mut finish_reason = None;
            let mut usage = crate::lm::Usage::default();
            let mut error: Option<ErrorMetadata> = None;

            while let Some(chunk_result) = inner_rx.recv().await {
                match &chunk_result {
                    Ok(chunk) => {
                        content.push_str(&chunk.content);
                        tool_calls.extend(chunk.tool_call_deltas.clone());
                        if chunk.finish_reason.is_some() {
                            finish_reason = chunk.finish_reason.clone();
                        }
                        if let Some(u) = &chunk.usage {
                            if u.total_tokens > 0 {
                                usage = u.clone();
                            }
                        }
                    }
                    Err(e) => {
                        error = Some(ErrorMetadata {
                            message: e.to_string(),
                            kind: "generation_error".to_string(),
                        });
                    }
                }
                if tx.send(chunk_result).await.is_err() {
                    break;
                }
            }

            let latency_ms = start.elapsed().as_millis() as u64;
            usage.latency_ms = latency_ms;
            usage.cost = (cost_fn)(&model, usage.prompt_tokens, usage.completion_tokens);

            let mut entry = entry_base;
            entry.response = ResponseMetadata {
                content_length: content.len(),
                tool_call_count: tool_calls.len(),
                finish_reason,
            };
            entry.usage = usage;
            entry.error = error;

            if let Some(collector) = collector {
                let _ = collector.submit(entry).await;
            }
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn supports_json(&self) -> bool {
        self.inner.supports_json()
    }

    fn supports_tools(&self) -> bool {
        self.inner.supports_tools()
    }
}
