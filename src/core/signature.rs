//! Signature — a description plus ordered input/output [`Field`] lists.
//!
//! Modeled as a plain runtime value rather than a compile-time derive-macro type:
//! the design notes call for validators that branch on declared `kind`, not Rust
//! type introspection, which only works if the schema itself is a runtime value.

use super::field::Field;

/// A description string plus two ordered field sequences: inputs and outputs.
///
/// Insertion order is preserved and is the presentation order in prompts and demos.
/// Field names must be unique within each side, and there must be at least one
/// output field for any module invocation.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub description: String,
    inputs: Vec<Field>,
    outputs: Vec<Field>,
}

impl Signature {
    pub fn new(description: impl Into<String>) -> Self {
        Signature {
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Appends an input field. Panics on a duplicate name within the input side.
    pub fn with_input(mut self, field: Field) -> Self {
        assert!(
            !self.inputs.iter().any(|f| f.name == field.name),
            "duplicate input field name `{}`",
            field.name
        );
        self.inputs.push(field);
        self
    }

    /// Appends an output field. Panics on a duplicate name within the output side.
    pub fn with_output(mut self, field: Field) -> Self {
        assert!(
            !self.outputs.iter().any(|f| f.name == field.name),
            "duplicate output field name `{}`",
            field.name
        );
        self.outputs.push(field);
        self
    }

    pub fn inputs(&self) -> &[Field] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Field] {
        &self.outputs
    }

    /// O(N_output) lookup by name.
    pub fn get_output_field(&self, name: &str) -> Option<&Field> {
        self.outputs.iter().find(|f| f.name == name)
    }

    pub fn get_input_field(&self, name: &str) -> Option<&Field> {
        self.inputs.iter().find(|f| f.name == name)
    }
}
