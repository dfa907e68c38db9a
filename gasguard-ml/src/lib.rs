//! Decision-tree hazard models for GasGuard
//!
//! ## Overview
//!
//! The rule-based estimator in `gasguard-core` answers "which gas, how much".
//! This crate answers the follow-up questions a deployment asks about the
//! same reading: how severe is the leak, how high is the fire risk, how
//! flammable is the mixture. Each question is a small classification
//! problem learned from labelled sensor data.
//!
//! ## Algorithms
//!
//! - **DecisionTree**: CART with Gini impurity. Cheap to train on the
//!   1024-row synthetic table and cheap to evaluate on a gateway.
//! - **RandomForest**: bootstrap-sampled trees with `sqrt(n_features)`
//!   feature subsampling, for the seven-sensor MQ measurement table.
//!
//! ```text
//! Dataset ─► LabelEncoder ─► DecisionTree / RandomForest ─► predict
//!    │                                 │
//!    └─ train_test_split ──────────────┴─► accuracy, ConfusionMatrix
//! ```
//!
//! ## Model Slots
//!
//! `HazardModels` holds one tree per `ModelSlot` (leak severity, fire
//! risk, flammability, gas type). Slots are an enum, so a prediction for
//! every slot is guaranteed at compile time.
//!
//! ```
//! use gasguard_ml::{Dataset, HazardModels, TrainConfig, ModelSlot};
//! use gasguard_core::RawReading;
//!
//! let data = Dataset::synthetic_mq2();
//! let (models, report) = HazardModels::train(&data, &TrainConfig::default()).unwrap();
//! assert!(report.accuracy(ModelSlot::LeakSeverity) > 0.9);
//!
//! let prediction = models.predict_reading(RawReading::new(700).unwrap()).unwrap();
//! assert_eq!(prediction.label(ModelSlot::LeakSeverity), "High");
//! ```
//!
//! ## Determinism
//!
//! All randomness (splits, bootstraps, feature subsets) comes from a seeded
//! `Rng`, so training the same data with the same seed yields the same model.

pub mod dataset;
pub mod forest;
pub mod labels;
pub mod models;
pub mod node;
pub mod scoring;
pub mod tree;

use thiserror::Error;

pub use dataset::{synthetic_ppm, CsvSummary, Dataset, LabelColumn};
pub use forest::{ForestConfig, RandomForest};
pub use labels::LabelEncoder;
pub use models::{
    HazardModels, HazardPrediction, ModelSlot, TrainConfig, TrainingReport, TreeGasClassifier,
};
pub use node::Node;
pub use scoring::{accuracy, derive_thresholds, ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use tree::{DecisionTree, TreeConfig};

/// Errors raised while loading data, training or predicting
#[derive(Error, Debug)]
pub enum MlError {
    #[error("not enough data: {0}")]
    InsufficientData(&'static str),

    #[error("feature count mismatch: expected {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("unknown label: {0}")]
    UnknownLabel(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("model not trained")]
    NotTrained,

    /// A loaded model whose node table cannot be walked safely
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for ML operations
pub type MlResult<T> = Result<T, MlError>;

/// Common interface of the tree-based classifiers
///
/// Features are rows of `f64`; targets are encoded class indices from a
/// `LabelEncoder`.
pub trait Classifier {
    /// Fit on `features` with class indices `targets` in `0..n_classes`
    fn fit(&mut self, features: &[Vec<f64>], targets: &[usize], n_classes: usize) -> MlResult<()>;

    /// Class probabilities for one row, summing to 1
    fn predict_proba(&self, row: &[f64]) -> MlResult<Vec<f64>>;

    /// Most likely class index for one row
    fn predict(&self, row: &[f64]) -> MlResult<usize>;

    /// Predictions for every row
    fn predict_all(&self, features: &[Vec<f64>]) -> MlResult<Vec<usize>> {
        features.iter().map(|row| self.predict(row)).collect()
    }
}

/// Index of the largest value; ties go to the lowest index
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Seeded xorshift generator
///
/// Small and reproducible across platforms; not for anything security related.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // xorshift is stuck at zero
        Self {
            state: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `0..n`; `n` must be non-zero
    pub fn next_range(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Uniform in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
