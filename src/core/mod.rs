//! Signatures, fields, validation, demonstrations, and the error taxonomy.

mod errors;
mod example;
mod field;
mod signature;
pub mod validate;
mod value;

pub use errors::{
    AdapterFailure, ConfigurationError, Error, ParseError, ProviderError, ValidationError,
};
pub use example::{Example, ExampleSet};
pub use field::Field;
pub use signature::Signature;
pub use validate::{
    normalize_class_value, validate_inputs, validate_outputs, validate_outputs_partial,
    Diagnostics, FieldMap,
};
pub use value::{matches_kind, FieldKind, FieldValue};
