//! Typed input/output validation, including the graceful "partial" variant used by
//! training/optimization loops that must never raise.

use indexmap::IndexMap;

use super::errors::ValidationError;
use super::signature::Signature;
use super::value::{matches_kind, FieldKind, FieldValue};

pub type FieldMap = IndexMap<String, FieldValue>;

/// Every non-optional input must be present by name. No type coercion happens on
/// the input side.
pub fn validate_inputs(signature: &Signature, inputs: &FieldMap) -> Result<(), ValidationError> {
    for field in signature.inputs() {
        if field.optional {
            continue;
        }
        match inputs.get(&field.name) {
            Some(v) if !v.is_null() => {}
            _ => return Err(ValidationError::MissingInput(field.name.clone())),
        }
    }
    Ok(())
}

/// For each declared output: presence (unless optional), type match by kind, and —
/// for `class` kind, after normalization — membership in the permitted set. Returns
/// the first error encountered; see [`validate_outputs_partial`] for a non-throwing
/// variant that collects every error.
pub fn validate_outputs(signature: &Signature, outputs: &FieldMap) -> Result<(), ValidationError> {
    for field in signature.outputs() {
        let value = outputs.get(&field.name);
        let value = match value {
            Some(v) if !v.is_null() => v,
            Some(_) | None if field.optional => continue,
            _ => return Err(ValidationError::MissingOutput(field.name.clone())),
        };

        if field.kind == FieldKind::Class {
            let raw = value.as_str().ok_or_else(|| ValidationError::TypeMismatch {
                field: field.name.clone(),
                expected: field.kind.to_string(),
            })?;
            let normalized = normalize_class_value(raw, field.permitted_values(), field.aliases());
            if !field.permitted_values().contains(&normalized) {
                return Err(ValidationError::InvalidClassValue {
                    field: field.name.clone(),
                    value: raw.to_string(),
                    permitted: field.permitted_values().to_vec(),
                });
            }
            continue;
        }

        if !matches_kind(field.kind, value) {
            return Err(ValidationError::TypeMismatch {
                field: field.name.clone(),
                expected: field.kind.to_string(),
            });
        }
    }
    Ok(())
}

/// Diagnostics collected by [`validate_outputs_partial`]. `has_errors` is `true` iff
/// any of `missing`, `type_errors`, or `class_errors` is non-empty.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub missing: Vec<String>,
    pub type_errors: IndexMap<String, String>,
    pub class_errors: IndexMap<String, String>,
}

impl Diagnostics {
    pub fn has_errors(&self) -> bool {
        !self.missing.is_empty() || !self.type_errors.is_empty() || !self.class_errors.is_empty()
    }
}

/// Non-throwing validation intended for training/optimization loops: missing
/// required fields are set to null in `outputs` (mutated in place), and every
/// problem is recorded in the returned [`Diagnostics`] rather than short-circuiting
/// on the first one.
pub fn validate_outputs_partial(signature: &Signature, outputs: &mut FieldMap) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();

    for field in signature.outputs() {
        let present = outputs.get(&field.name).filter(|v| !v.is_null()).cloned();
        let Some(value) = present else {
            if !field.optional {
                diagnostics.missing.push(field.name.clone());
            }
            outputs.insert(field.name.clone(), FieldValue::Null);
            continue;
        };

        if field.kind == FieldKind::Class {
            match value.as_str() {
                Some(raw) => {
                    let normalized =
                        normalize_class_value(raw, field.permitted_values(), field.aliases());
                    if field.permitted_values().contains(&normalized) {
                        outputs.insert(field.name.clone(), FieldValue::String(normalized));
                    } else {
                        diagnostics.class_errors.insert(
                            field.name.clone(),
                            format!(
                                "`{raw}` is not one of {:?}",
                                field.permitted_values()
                            ),
                        );
                    }
                }
                None => {
                    diagnostics
                        .type_errors
                        .insert(field.name.clone(), "expected class (string)".to_string());
                }
            }
            continue;
        }

        if !matches_kind(field.kind, &value) {
            diagnostics
                .type_errors
                .insert(field.name.clone(), format!("expected {}", field.kind));
        }
    }

    diagnostics
}

/// The class normalization rule (spec §4.1):
/// 1. trim whitespace
/// 2. case-insensitive match against a permitted value -> canonicalize to it
/// 3. else case-insensitive match against an alias source -> its target
/// 4. else return unchanged (validation then rejects it)
pub fn normalize_class_value(
    raw: &str,
    permitted: &[String],
    aliases: &std::collections::HashMap<String, String>,
) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();

    if let Some(canonical) = permitted.iter().find(|p| p.to_lowercase() == lower) {
        return canonical.clone();
    }
    if let Some(target) = aliases.get(&lower) {
        return target.clone();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Field;
    use rstest::rstest;
    use std::collections::HashMap;

    fn sentiment_field() -> Field {
        let mut aliases = HashMap::new();
        aliases.insert("pos".to_string(), "positive".to_string());
        aliases.insert("neg".to_string(), "negative".to_string());
        Field::class(
            "sentiment",
            "",
            vec![
                "positive".to_string(),
                "negative".to_string(),
                "neutral".to_string(),
            ],
            aliases,
        )
    }

    #[rstest]
    #[case("POS", "positive")]
    #[case(" positive ", "positive")]
    #[case("NEUTRAL", "neutral")]
    #[case("neg", "negative")]
    fn normalizes_case_and_aliases(#[case] input: &str, #[case] expected: &str) {
        let field = sentiment_field();
        let normalized =
            normalize_class_value(input, field.permitted_values(), field.aliases());
        assert_eq!(normalized, expected);
    }

    #[test]
    fn rejects_value_outside_permitted_set_and_aliases() {
        let sig = Signature::new("").with_output(sentiment_field());
        let mut outputs = FieldMap::new();
        outputs.insert("sentiment".to_string(), FieldValue::String("mixed".into()));
        assert!(validate_outputs(&sig, &outputs).is_err());
    }

    #[test]
    fn partial_validation_sets_missing_required_to_null_and_never_panics() {
        let sig = Signature::new("")
            .with_output(super::super::field::Field::new(
                "answer",
                FieldKind::String,
                "",
            ))
            .with_output(sentiment_field());
        let mut outputs = FieldMap::new();
        let diagnostics = validate_outputs_partial(&sig, &mut outputs);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.missing, vec!["answer", "sentiment"]);
        assert_eq!(outputs.get("answer"), Some(&FieldValue::Null));
    }
}
