//! String label <-> class index mapping

use serde::{Deserialize, Serialize};

use crate::{MlError, MlResult};

/// Maps class labels to dense indices
///
/// Classes are stored sorted, so the same label set always encodes the same
/// way regardless of the order rows arrive in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the class set from `labels`
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> MlResult<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| MlError::UnknownLabel(label.to_string()))
    }

    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> MlResult<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_deduplicated() {
        let encoder = LabelEncoder::fit(&["Methane", "Air", "Butane", "Air"]);
        assert_eq!(encoder.classes(), &["Air", "Butane", "Methane"]);
        assert_eq!(encoder.encode("Butane").unwrap(), 1);
        assert_eq!(encoder.decode(2), Some("Methane"));
        assert_eq!(encoder.decode(3), None);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let encoder = LabelEncoder::fit(&["Low", "High"]);
        assert!(matches!(encoder.encode("Medium"), Err(MlError::UnknownLabel(_))));
    }

    #[test]
    fn encode_all_preserves_order() {
        let encoder = LabelEncoder::fit(&["b", "a"]);
        assert_eq!(encoder.encode_all(&["a", "b", "a"]).unwrap(), vec![0, 1, 0]);
    }
}
