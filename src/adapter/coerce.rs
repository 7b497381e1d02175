//! Shared post-parse coercion (spec §4.5): every adapter funnels its raw parsed map
//! through this before returning, regardless of which route (JSON, markers,
//! heuristics) produced it.

use crate::core::{FieldKind, FieldMap, FieldValue, Signature};

/// For each declared output field, attempts to coerce the raw value to its
/// declared kind. Uncoercible values pass through unchanged; validation decides
/// their fate.
///
/// - `int` accepts a trimmed numeric string (percent sign stripped) or a float with
///   no fractional part.
/// - `float` accepts a numeric string or an integer.
/// - `bool` accepts common truth-string spellings.
/// - `string` accepts an array, joined by newlines, only when `allow_array_to_string`
///   (the JSON adapter path — marker text never contains a JSON array node).
pub fn coerce_outputs(signature: &Signature, raw: &FieldMap, allow_array_to_string: bool) -> FieldMap {
    let mut coerced = FieldMap::new();

    for field in signature.outputs() {
        let Some(value) = raw.get(&field.name) else {
            continue;
        };
        coerced.insert(
            field.name.clone(),
            coerce_one(field.kind, value, allow_array_to_string),
        );
    }

    // Provenance/passthrough keys (e.g. `__adapter_used`) aren't declared outputs;
    // carry them through untouched.
    for (key, value) in raw {
        if !coerced.contains_key(key) {
            coerced.insert(key.clone(), value.clone());
        }
    }

    coerced
}

fn coerce_one(kind: FieldKind, value: &FieldValue, allow_array_to_string: bool) -> FieldValue {
    match kind {
        FieldKind::Int => coerce_int(value).unwrap_or_else(|| value.clone()),
        FieldKind::Float => coerce_float(value).unwrap_or_else(|| value.clone()),
        FieldKind::Bool => coerce_bool(value).unwrap_or_else(|| value.clone()),
        FieldKind::String | FieldKind::Class | FieldKind::Image | FieldKind::Datetime => {
            coerce_string(value, allow_array_to_string).unwrap_or_else(|| value.clone())
        }
        FieldKind::Json => value.clone(),
    }
}

fn coerce_int(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Int(_) => Some(value.clone()),
        FieldValue::Float(f) if f.fract() == 0.0 => Some(FieldValue::Int(*f as i64)),
        FieldValue::String(s) => {
            let trimmed = s.trim().trim_end_matches('%');
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(FieldValue::Int(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0)
                .map(|f| FieldValue::Int(f as i64))
        }
        _ => None,
    }
}

fn coerce_float(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Float(_) => Some(value.clone()),
        FieldValue::Int(i) => Some(FieldValue::Float(*i as f64)),
        FieldValue::String(s) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .ok()
            .map(FieldValue::Float),
        _ => None,
    }
}

fn coerce_bool(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Bool(_) => Some(value.clone()),
        FieldValue::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(FieldValue::Bool(true)),
            "false" | "no" | "n" | "0" => Some(FieldValue::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_string(value: &FieldValue, allow_array_to_string: bool) -> Option<FieldValue> {
    match value {
        FieldValue::String(_) => Some(value.clone()),
        FieldValue::Json(serde_json::Value::Array(items)) if allow_array_to_string => {
            let joined = items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n");
            Some(FieldValue::String(joined))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Field;

    fn sig() -> Signature {
        Signature::new("")
            .with_output(Field::new("n", FieldKind::Int, ""))
            .with_output(Field::new("score", FieldKind::Float, ""))
            .with_output(Field::new("ok", FieldKind::Bool, ""))
            .with_output(Field::new("text", FieldKind::String, ""))
    }

    #[test]
    fn coerces_percent_stripped_int_string() {
        let mut raw = FieldMap::new();
        raw.insert("n".into(), FieldValue::String("42%".into()));
        let coerced = coerce_outputs(&sig(), &raw, false);
        assert_eq!(coerced.get("n"), Some(&FieldValue::Int(42)));
    }

    #[test]
    fn coerces_numeric_string_to_float() {
        let mut raw = FieldMap::new();
        raw.insert("score".into(), FieldValue::String("0.75".into()));
        let coerced = coerce_outputs(&sig(), &raw, false);
        assert_eq!(coerced.get("score"), Some(&FieldValue::Float(0.75)));
    }

    #[test]
    fn coerces_truth_strings() {
        let mut raw = FieldMap::new();
        raw.insert("ok".into(), FieldValue::String("yes".into()));
        let coerced = coerce_outputs(&sig(), &raw, false);
        assert_eq!(coerced.get("ok"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn joins_array_to_string_only_when_allowed() {
        let mut raw = FieldMap::new();
        let arr = FieldValue::Json(serde_json::json!(["a", "b"]));
        raw.insert("text".into(), arr.clone());

        let disallowed = coerce_outputs(&sig(), &raw, false);
        assert_eq!(disallowed.get("text"), Some(&arr));

        let allowed = coerce_outputs(&sig(), &raw, true);
        assert_eq!(allowed.get("text"), Some(&FieldValue::String("a\nb".into())));
    }

    #[test]
    fn uncoercible_values_pass_through_unchanged() {
        let mut raw = FieldMap::new();
        raw.insert("n".into(), FieldValue::String("not a number".into()));
        let coerced = coerce_outputs(&sig(), &raw, false);
        assert_eq!(coerced.get("n"), Some(&FieldValue::String("not a number".into())));
    }
}
