//! Demonstrations for few-shot prompting.

use rand::seq::SliceRandom;

use super::validate::FieldMap;

/// A labeled input/output pair used for few-shot demos. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Example {
    pub input: FieldMap,
    pub output: FieldMap,
    pub label: Option<String>,
    pub weight: f64,
    pub description: Option<String>,
}

impl Example {
    pub fn new(input: FieldMap, output: FieldMap) -> Self {
        Example {
            input,
            output,
            label: None,
            weight: 1.0,
            description: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An ordered, named collection of [`Example`]s.
#[derive(Debug, Clone, Default)]
pub struct ExampleSet {
    pub name: String,
    examples: Vec<Example>,
}

impl ExampleSet {
    pub fn new(name: impl Into<String>, examples: Vec<Example>) -> Self {
        ExampleSet {
            name: name.into(),
            examples,
        }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn as_slice(&self) -> &[Example] {
        &self.examples
    }

    /// The first `n` examples, in order.
    pub fn get_n(&self, n: usize) -> Vec<Example> {
        self.examples.iter().take(n).cloned().collect()
    }

    /// A uniform sample of `n` examples without replacement. `n <= 0` returns all.
    pub fn get_random(&self, n: i64) -> Vec<Example> {
        if n <= 0 {
            return self.examples.clone();
        }
        let n = (n as usize).min(self.examples.len());
        let mut rng = rand::thread_rng();
        let mut indices: Vec<usize> = (0..self.examples.len()).collect();
        indices.shuffle(&mut rng);
        indices
            .into_iter()
            .take(n)
            .map(|i| self.examples[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(n: usize) -> ExampleSet {
        let examples = (0..n)
            .map(|i| Example::new(FieldMap::new(), FieldMap::new()).with_label(i.to_string()))
            .collect();
        ExampleSet::new("demo", examples)
    }

    #[test]
    fn get_n_returns_prefix() {
        let set = set_of(5);
        let prefix = set.get_n(3);
        assert_eq!(prefix.len(), 3);
        assert_eq!(prefix[0].label.as_deref(), Some("0"));
    }

    #[test]
    fn get_random_nonpositive_returns_all() {
        let set = set_of(4);
        assert_eq!(set.get_random(0).len(), 4);
        assert_eq!(set.get_random(-1).len(), 4);
    }

    #[test]
    fn get_random_without_replacement() {
        let set = set_of(10);
        let sampled = set.get_random(5);
        assert_eq!(sampled.len(), 5);
        let mut labels: Vec<_> = sampled.iter().filter_map(|e| e.label.clone()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 5);
    }
}
