//! The tagged-variant value type that replaces the source design's dynamic
//! `string -> any` output map (design note: "Dynamic output maps").
//!
//! Validators and coercion branch on [`FieldKind`], never on Rust-level type
//! introspection of the value itself.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;

/// The kind tag a [`Field`](crate::core::Field) declares, and the only axis
/// validators/coercion branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    Json,
    Class,
    Image,
    Datetime,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Json => "json",
            FieldKind::Class => "class",
            FieldKind::Image => "image",
            FieldKind::Datetime => "datetime",
        };
        f.write_str(s)
    }
}

/// A typed field value: text, one of the numeric kinds, a boolean, an arbitrary JSON
/// subtree, or null (valid only for optional fields — see
/// [`validate_outputs`](crate::core::validate::validate_outputs)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(Json),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Runtime kind this value would satisfy under the type-match table (spec §4.1),
    /// used only for diagnostics — actual matching is done by [`matches_kind`].
    pub fn describe(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "bool",
            FieldValue::Json(_) => "json",
            FieldValue::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Like [`as_i64`](FieldValue::as_i64) but truncates a non-integral float
    /// instead of rejecting it — used by [`Prediction`](crate::data::Prediction)'s
    /// integer getter (spec §4.2), not by kind-matching.
    pub fn as_i64_truncating(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            FieldValue::String(s) => Json::String(s.clone()),
            FieldValue::Int(i) => Json::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            FieldValue::Bool(b) => Json::Bool(*b),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => Json::Null,
        }
    }

    pub fn from_json(value: Json) -> FieldValue {
        match value {
            Json::Null => FieldValue::Null,
            Json::Bool(b) => FieldValue::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Json::String(s) => FieldValue::String(s),
            other => FieldValue::Json(other),
        }
    }
}

/// The type-match table of spec §4.1: does `value` count as a valid runtime value
/// for `kind`? Null is valid only where the caller already knows the field is
/// optional — this function does not consult optionality.
pub fn matches_kind(kind: FieldKind, value: &FieldValue) -> bool {
    match (kind, value) {
        (_, FieldValue::Null) => false,
        (FieldKind::String | FieldKind::Class | FieldKind::Image | FieldKind::Datetime, v) => {
            v.as_str().is_some()
        }
        (FieldKind::Int, v) => v.as_i64().is_some(),
        (FieldKind::Float, v) => v.as_f64().is_some(),
        (FieldKind::Bool, v) => v.as_bool().is_some(),
        (FieldKind::Json, v) => match v {
            FieldValue::Json(Json::Object(_)) | FieldValue::Json(Json::Array(_)) => true,
            FieldValue::String(s) => serde_json::from_str::<Json>(s).is_ok(),
            _ => false,
        },
    }
}
