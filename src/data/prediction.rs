//! Prediction — the typed output container returned by a module call.

use crate::core::{FieldMap, FieldValue};
use crate::lm::Usage;

/// A module call's typed output, bundled with usage and adapter-provenance
/// metadata (spec §3/§7: which adapter succeeded, how many attempts, whether the
/// fallback chain was invoked).
#[derive(Debug, Clone, Default)]
pub struct Prediction {
    pub outputs: FieldMap,
    pub rationale: Option<String>,
    pub score: Option<f64>,
    pub alternatives: Vec<FieldMap>,
    pub usage: Usage,
    pub module_name: Option<String>,
    pub inputs: FieldMap,
    pub adapter_used: Option<String>,
    pub parse_attempts: usize,
    pub fallback_used: bool,
}

impl Prediction {
    pub fn new(outputs: FieldMap) -> Self {
        Prediction {
            outputs,
            ..Default::default()
        }
    }

    pub fn get_string(&self, key: &str) -> Option<(String, bool)> {
        match self.outputs.get(key) {
            Some(FieldValue::String(s)) => Some((s.clone(), true)),
            Some(FieldValue::Null) | None => None,
            Some(other) => Some((other.to_json().to_string(), true)),
        }
    }

    /// Accepts a floating-point value and truncates it (spec §4.2).
    pub fn get_int(&self, key: &str) -> Option<(i64, bool)> {
        self.outputs
            .get(key)
            .and_then(|v| v.as_i64_truncating())
            .map(|i| (i, true))
    }

    pub fn get_float(&self, key: &str) -> Option<(f64, bool)> {
        self.outputs.get(key).and_then(|v| v.as_f64()).map(|f| (f, true))
    }

    pub fn get_bool(&self, key: &str) -> Option<(bool, bool)> {
        self.outputs.get(key).and_then(|v| v.as_bool()).map(|b| (b, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_getter_truncates_float() {
        let mut outputs = FieldMap::new();
        outputs.insert("confidence".to_string(), FieldValue::Float(0.95));
        let prediction = Prediction::new(outputs);
        assert_eq!(prediction.get_int("confidence"), Some((0, true)));
    }

    #[test]
    fn missing_key_returns_none() {
        let prediction = Prediction::new(FieldMap::new());
        assert_eq!(prediction.get_string("answer"), None);
    }
}
