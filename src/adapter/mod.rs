//! Adapters (C5): the bidirectional bridge between a [`Signature`] and free-form
//! LLM text. Four variants share one trait: [`ChatAdapter`], [`JsonAdapter`],
//! [`TwoStepAdapter`], [`FallbackAdapter`].

mod chat_adapter;
pub mod coerce;
mod fallback_adapter;
mod json_adapter;
mod two_step_adapter;

pub use chat_adapter::ChatAdapter;
pub use fallback_adapter::FallbackAdapter;
pub use json_adapter::JsonAdapter;
pub use two_step_adapter::TwoStepAdapter;

use async_trait::async_trait;

use crate::core::{Example, FieldMap, ParseError, Signature};
use crate::data::{History, Message};

/// The shared capability every adapter variant implements: format a signature plus
/// inputs/demos into chat messages, and parse a completion back into a typed map.
///
/// `parse` is async even though most variants resolve it synchronously, because
/// [`TwoStepAdapter`] calls out to an extraction LM as part of parsing.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn format(&self, signature: &Signature, inputs: &FieldMap, demos: &[Example]) -> Vec<Message>;

    async fn parse(&self, signature: &Signature, completion: &str) -> Result<FieldMap, ParseError>;

    /// Renders prior conversation turns as chat messages. Default: pass them
    /// through unchanged.
    fn format_history(&self, history: &History) -> Vec<Message> {
        history.messages().cloned().collect()
    }

    /// Toggles a reasoning preamble/field, where the adapter supports one. Default:
    /// no-op. Excluded from the trait's object-safety surface would be wrong here —
    /// adapters held as `Box<dyn Adapter>` (e.g. inside `FallbackAdapter`) still need
    /// to receive this, so it takes `&mut self` rather than being `Sized`-only.
    fn set_reasoning(&mut self, _enabled: bool) {}

    fn adapter_name(&self) -> &'static str;
}
