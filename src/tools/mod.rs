//! Typed description of callable tools (C10): used by providers to build their wire
//! schema and by adapters to fold tool-use metadata into the cache key.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::FieldKind;

/// One parameter of a [`Tool`]'s call signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
    pub enum_values: Option<Vec<String>>,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        ToolParameter {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            enum_values: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

type ToolFn = Arc<dyn Fn(serde_json::Value) -> anyhow::Result<serde_json::Value> + Send + Sync>;

/// A callable tool: name, description, ordered parameter list, and the callable
/// itself. The callable is not part of `Eq`/cache-key derivation — only the schema
/// is (see [`crate::cache`]'s fingerprint construction).
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
    pub call: ToolFn,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
        call: ToolFn,
    ) -> Self {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
            call,
        }
    }

    pub fn invoke(&self, arguments: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        (self.call)(arguments)
    }
}

/// A tool call as issued by an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// An incremental update to a tool call, as seen mid-stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCallDelta {
    pub index: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments_fragment: String,
}
