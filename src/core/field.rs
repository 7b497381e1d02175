//! Field — one named, typed slot on a [`Signature`](crate::core::Signature).

use std::collections::HashMap;

use super::value::FieldKind;

/// A named, typed field on a [`Signature`](crate::core::Signature).
///
/// Construct via [`Field::new`] for non-class kinds or [`Field::class`] for `class`
/// kind, which enforces the invariant that a class field carries a non-empty
/// permitted-value list.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub description: String,
    pub optional: bool,
    /// Permitted values, ordered, for `kind == Class`. Empty for every other kind.
    permitted_values: Vec<String>,
    /// Case-insensitive source -> canonical value, for `kind == Class`.
    aliases: HashMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        assert!(
            kind != FieldKind::Class,
            "Field::new cannot build a class field; use Field::class"
        );
        Field {
            name: name.into(),
            kind,
            description: description.into(),
            optional: false,
            permitted_values: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// Builds a `class` field. Panics if `permitted_values` is empty or if any alias
    /// target is not itself a permitted value — both invariants from spec §3.
    pub fn class(
        name: impl Into<String>,
        description: impl Into<String>,
        permitted_values: Vec<String>,
        aliases: HashMap<String, String>,
    ) -> Self {
        assert!(
            !permitted_values.is_empty(),
            "class field must have a non-empty permitted-value list"
        );
        for target in aliases.values() {
            assert!(
                permitted_values.contains(target),
                "alias target `{target}` is not a permitted value"
            );
        }
        Field {
            name: name.into(),
            kind: FieldKind::Class,
            description: description.into(),
            optional: false,
            permitted_values,
            aliases: aliases
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn permitted_values(&self) -> &[String] {
        &self.permitted_values
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }
}
