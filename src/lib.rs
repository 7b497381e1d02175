//! A typed prompt/response transport layer for LLM applications.
//!
//! You declare a [`Signature`](core::Signature) — named, typed input and output
//! fields with descriptions — and pair it with an [`Adapter`](adapter::Adapter) that
//! formats it into chat [`Message`](data::Message)s and parses a free-form completion
//! back into typed values. An [`Lm`](lm::Lm) (typically wrapped in
//! [`ObservabilityWrapper`](observability::ObservabilityWrapper) for cost/latency
//! accounting and a [`Cache`](cache::Cache) for deterministic memoization) performs
//! the actual call.
//!
//! # Crate organization
//!
//! - [`core`] — [`Signature`](core::Signature), [`Field`](core::Field), validation,
//!   [`Example`](core::Example)/[`ExampleSet`](core::ExampleSet), the error taxonomy.
//! - [`data`] — [`Message`](data::Message), [`History`](data::History),
//!   [`Prediction`](data::Prediction).
//! - [`json`] — JSON extraction and best-effort repair of dirty LLM output.
//! - [`streaming`] — accumulation and repair of truncated field markers mid-stream.
//! - [`adapter`] — [`ChatAdapter`](adapter::ChatAdapter),
//!   [`JsonAdapter`](adapter::JsonAdapter), [`TwoStepAdapter`](adapter::TwoStepAdapter),
//!   [`FallbackAdapter`](adapter::FallbackAdapter).
//! - [`lm`] — the [`Lm`](lm::Lm) contract (generate/stream) any provider implements.
//! - [`cache`] — the deterministic, fingerprint-keyed LRU+TTL cache.
//! - [`observability`] — the wrapper that turns any `Lm` into one that records
//!   [`HistoryEntry`](observability::HistoryEntry)s.
//! - [`tools`] — typed tool/function-call schema.
//! - [`settings`] — the process-wide configuration registry and `Lm` factory.
//! - [`modules`] — thin prompting strategies ([`Predict`](modules::Predict),
//!   [`ChainOfThought`](modules::ChainOfThought)) built on the above. Not the focus of
//!   this crate — real strategy libraries belong on top of it.
//! - [`providers`] — a deterministic in-memory `Lm` used by tests and examples.
//!
//! # Non-goals
//!
//! This is not a training framework: there is no gradient descent over prompts, no
//! demo/instruction optimizer. It does not host or run models, and it does not
//! guarantee determinism of model output — only of cache keys and of parsing a fixed
//! completion string.

pub mod adapter;
pub mod cache;
pub mod core;
pub mod data;
pub mod json;
pub mod lm;
pub mod modules;
pub mod observability;
pub mod providers;
pub mod settings;
pub mod streaming;
pub mod telemetry;
pub mod tools;

pub use crate::core::{
    Diagnostics, Error, Example, ExampleSet, Field, FieldKind, FieldValue, Signature,
};
pub use adapter::{Adapter, ChatAdapter, FallbackAdapter, JsonAdapter, TwoStepAdapter};
pub use cache::{Cache, DeterministicCache};
pub use data::{History, Message, Prediction, Role};
pub use lm::{GenerateOptions, GenerateResult, Lm};
pub use modules::{ChainOfThought, Predict};
pub use observability::{Collector, ObservabilityWrapper};
pub use providers::DummyLm;
pub use settings::{configure, from_env, new_lm, Settings};
