//! Evaluation metrics and decision thresholds
//!
//! Metrics take encoded class indices; the `LabelEncoder` is only needed to
//! put names on the rows of a report.

use std::fmt;

use serde::Serialize;

use crate::labels::LabelEncoder;
use crate::{Classifier, MlError, MlResult};

/// Fraction of predictions equal to the truth
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Counts of (actual, predicted) class pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    n_classes: usize,
    /// Row = actual class, column = predicted class
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> MlResult<Self> {
        if y_true.len() != y_pred.len() {
            return Err(MlError::InvalidConfig("prediction count differs from truth count"));
        }

        let mut counts = vec![vec![0; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t >= n_classes || p >= n_classes {
                return Err(MlError::InvalidConfig("class index out of range"));
            }
            counts[t][p] += 1;
        }

        Ok(Self { n_classes, counts })
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual][predicted]
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    fn predicted_total(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    fn actual_total(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.counts {
            let cells: Vec<String> = row.iter().map(|c| format!("{:>6}", c)).collect();
            writeln!(f, "[{} ]", cells.join(""))?;
        }
        Ok(())
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus overall accuracy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_f1: f64,
}

impl ClassificationReport {
    pub fn new(y_true: &[usize], y_pred: &[usize], encoder: &LabelEncoder) -> MlResult<Self> {
        let matrix = ConfusionMatrix::new(y_true, y_pred, encoder.len())?;

        let classes: Vec<ClassMetrics> = encoder
            .classes()
            .iter()
            .enumerate()
            .map(|(class, label)| {
                let tp = matrix.true_positives(class) as f64;
                let predicted = matrix.predicted_total(class) as f64;
                let support = matrix.actual_total(class);

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);

                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let macro_f1 = if classes.is_empty() {
            0.0
        } else {
            classes.iter().map(|c| c.f1).sum::<f64>() / classes.len() as f64
        };

        Ok(Self {
            classes,
            accuracy: accuracy(y_true, y_pred),
            macro_f1,
        })
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>16} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>16} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>16} {:>32.2}", "accuracy", self.accuracy)?;
        write!(f, "{:>16} {:>32.2}", "macro f1", self.macro_f1)
    }
}

/// 0 when the denominator is 0
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Linear-interpolated percentile (`q` in 0..=100) of unsorted values
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Per-class decision thresholds
///
/// For each class, the 95th percentile of the model's probability for that
/// class over every row of `features`.
pub fn derive_thresholds<C: Classifier>(
    model: &C,
    features: &[Vec<f64>],
    encoder: &LabelEncoder,
) -> MlResult<Vec<(String, f64)>> {
    if features.is_empty() {
        return Err(MlError::InsufficientData("no rows to derive thresholds from"));
    }

    let probabilities: Vec<Vec<f64>> = features
        .iter()
        .map(|row| model.predict_proba(row))
        .collect::<MlResult<_>>()?;

    let thresholds = encoder
        .classes()
        .iter()
        .enumerate()
        .map(|(class, label)| {
            let column: Vec<f64> = probabilities.iter().map(|p| p[class]).collect();
            let threshold = percentile(&column, 95.0).unwrap_or(0.0);
            (label.clone(), threshold)
        })
        .collect();

    Ok(thresholds)
}
