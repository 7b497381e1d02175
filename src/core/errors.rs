//! The five error kinds named in the transport layer's contract: validation,
//! parsing, provider transport, configuration, and cancellation.

use std::fmt;

/// Top-level error for the transport layer.
///
/// Each variant names the kind explicitly (spec §7) rather than leaving callers to
/// pattern-match on a message string.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("operation cancelled: {0}")]
    Cancellation(String),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "ValidationError",
            Error::Parse(_) => "ParseError",
            Error::Provider(_) => "ProviderError",
            Error::Configuration(_) => "ConfigurationError",
            Error::Cancellation(_) => "CancellationError",
        }
    }
}

/// Missing required input/output, type mismatch, or a class value outside the
/// permitted set after normalization.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required input field `{0}`")]
    MissingInput(String),

    #[error("missing required output field `{0}`")]
    MissingOutput(String),

    #[error("output field `{field}` expected kind {expected}, got a value that does not match")]
    TypeMismatch { field: String, expected: String },

    #[error(
        "output field `{field}` has value `{value}` which is not one of the permitted class values {permitted:?}"
    )]
    InvalidClassValue {
        field: String,
        value: String,
        permitted: Vec<String>,
    },
}

/// JSON not found, malformed after repair, required field markers missing after
/// heuristics, or an extraction-LM result that wasn't an object.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no balanced JSON object found in completion")]
    NoJsonFound,

    #[error("JSON parse failed even after repair: {reason}")]
    MalformedJson { reason: String, content: String },

    #[error("required field marker(s) missing after heuristic extraction: {0:?}")]
    MissingFields(Vec<String>),

    #[error("extraction LM response was not a JSON object")]
    ExtractionNotObject,

    #[error("all adapters in the fallback chain failed: {0}")]
    FallbackExhausted(String),

    #[error("adapter `{adapter}` failed: {reason}")]
    AdapterFailed { adapter: String, reason: String },
}

impl fmt::Display for AdapterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.adapter, self.reason)
    }
}

/// One adapter's failure reason, collected by [`FallbackAdapter`](crate::adapter::FallbackAdapter)
/// into [`ParseError::FallbackExhausted`].
#[derive(Debug, Clone)]
pub struct AdapterFailure {
    pub adapter: String,
    pub reason: String,
}

/// Transport/API failure from the inner LM.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("could not reach provider `{provider}`: {message}")]
    Network { provider: String, message: String },

    #[error("rate limited by provider `{provider}`")]
    RateLimit { provider: String },

    #[error("invalid response from provider `{provider}`: HTTP {status}")]
    InvalidResponse { provider: String, status: u16 },

    #[error("provider `{provider}` error: {message}")]
    Other { provider: String, message: String },
}

/// No provider, no model, unregistered provider, or `TwoStepAdapter` with no
/// extraction LM.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no default provider configured")]
    NoProvider,

    #[error("no default model configured")]
    NoModel,

    #[error("no LM factory registered for provider `{0}`")]
    UnregisteredProvider(String),

    #[error("TwoStepAdapter requires an extraction LM but none was supplied")]
    MissingExtractionLm,
}
