//! Hazard models: one decision tree per question asked of a reading
//!
//! ```text
//!                      ┌─► leak_severity  tree ─► "Low" | "Moderate" | "High"
//! [sensor_reading,  ───┼─► fire_risk      tree ─► "Low" | "Medium"   | "High"
//!  ppm]                ├─► flammability   tree ─► "Low" | "Moderate" | "High"
//!                      └─► gas_type       tree ─► "Methane" | "Butane" | "Air"
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use gasguard_core::constants::circuit::UNBOUNDED_DISPLAY_KOHM;
use gasguard_core::{
    GasClassifier, GasType, HazardAssessment, HazardLevel, RawReading, Resistance,
    ResistanceConverter,
};
use serde::{Deserialize, Serialize};

use crate::dataset::{synthetic_ppm, Dataset, GAS_TYPE_COLUMN};
use crate::labels::LabelEncoder;
use crate::scoring::{accuracy, ClassificationReport};
use crate::tree::{DecisionTree, TreeConfig};
use crate::{Classifier, MlError, MlResult};

/// Question answered by one hazard model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSlot {
    LeakSeverity,
    FireRisk,
    Flammability,
    GasType,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 4] = [
        ModelSlot::LeakSeverity,
        ModelSlot::FireRisk,
        ModelSlot::Flammability,
        ModelSlot::GasType,
    ];

    /// Label column this slot is trained on
    pub fn key(&self) -> &'static str {
        match self {
            Self::LeakSeverity => "leak_severity",
            Self::FireRisk => "fire_risk",
            Self::Flammability => "flammability",
            Self::GasType => GAS_TYPE_COLUMN,
        }
    }
}

impl std::fmt::Display for ModelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Training parameters shared by every slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub tree: TreeConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            tree: TreeConfig::default(),
        }
    }
}

/// Fitted tree with its label mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotModel {
    encoder: LabelEncoder,
    tree: DecisionTree,
}

impl SlotModel {
    fn predict(&self, row: &[f64]) -> MlResult<String> {
        let class = self.tree.predict(row)?;
        self.encoder
            .decode(class)
            .map(str::to_string)
            .ok_or(MlError::NotTrained)
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }
}

/// Held-out evaluation of one slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotReport {
    pub slot: ModelSlot,
    pub accuracy: f64,
    pub report: ClassificationReport,
}

/// Evaluation of every slot after training
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub slots: Vec<SlotReport>,
}

impl TrainingReport {
    pub fn accuracy(&self, slot: ModelSlot) -> f64 {
        self.slots
            .iter()
            .find(|s| s.slot == slot)
            .map_or(0.0, |s| s.accuracy)
    }
}

/// One label per model slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HazardPrediction {
    pub leak_severity: String,
    pub fire_risk: String,
    pub flammability: String,
    pub gas_type: String,
}

impl HazardPrediction {
    pub fn label(&self, slot: ModelSlot) -> &str {
        match slot {
            ModelSlot::LeakSeverity => &self.leak_severity,
            ModelSlot::FireRisk => &self.fire_risk,
            ModelSlot::Flammability => &self.flammability,
            ModelSlot::GasType => &self.gas_type,
        }
    }

    /// Hazard levels, if every hazard label is a known level
    pub fn assessment(&self) -> Option<HazardAssessment> {
        Some(HazardAssessment {
            leak_severity: HazardLevel::from_label(&self.leak_severity)?,
            fire_risk: HazardLevel::from_label(&self.fire_risk)?,
            flammability: HazardLevel::from_label(&self.flammability)?,
        })
    }
}

/// The four fitted hazard models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardModels {
    leak_severity: SlotModel,
    fire_risk: SlotModel,
    flammability: SlotModel,
    gas_type: SlotModel,
}

impl HazardModels {
    /// Fit one tree per slot on `[sensor_reading, ppm]` features
    ///
    /// All slots share one train/test split so their accuracies compare.
    pub fn train(data: &Dataset, config: &TrainConfig) -> MlResult<(Self, TrainingReport)> {
        if data.n_features() != 2 {
            return Err(MlError::FeatureMismatch {
                expected: 2,
                actual: data.n_features(),
            });
        }

        let (train, test) = data.train_test_split(config.test_fraction, config.seed)?;
        let mut reports = Vec::with_capacity(ModelSlot::ALL.len());

        let mut fit = |slot: ModelSlot| -> MlResult<SlotModel> {
            // Encoder sees every label so test rows always encode
            let encoder = LabelEncoder::fit(data.labels(slot.key())?);
            let train_targets = encoder.encode_all(train.labels(slot.key())?)?;
            let test_targets = encoder.encode_all(test.labels(slot.key())?)?;

            let mut tree = DecisionTree::new(config.tree);
            tree.fit(train.features(), &train_targets, encoder.len())?;

            let predicted = tree.predict_all(test.features())?;
            let slot_accuracy = accuracy(&test_targets, &predicted);
            log::info!("{} model accuracy: {:.4}", slot, slot_accuracy);

            reports.push(SlotReport {
                slot,
                accuracy: slot_accuracy,
                report: ClassificationReport::new(&test_targets, &predicted, &encoder)?,
            });

            Ok(SlotModel { encoder, tree })
        };

        let models = Self {
            leak_severity: fit(ModelSlot::LeakSeverity)?,
            fire_risk: fit(ModelSlot::FireRisk)?,
            flammability: fit(ModelSlot::Flammability)?,
            gas_type: fit(ModelSlot::GasType)?,
        };

        let report = TrainingReport {
            train_rows: train.len(),
            test_rows: test.len(),
            slots: reports,
        };

        Ok((models, report))
    }

    pub fn slot(&self, slot: ModelSlot) -> &SlotModel {
        match slot {
            ModelSlot::LeakSeverity => &self.leak_severity,
            ModelSlot::FireRisk => &self.fire_risk,
            ModelSlot::Flammability => &self.flammability,
            ModelSlot::GasType => &self.gas_type,
        }
    }

    /// Labels for every slot
    pub fn predict(&self, sensor_reading: f64, ppm: f64) -> MlResult<HazardPrediction> {
        let row = [sensor_reading, ppm];
        Ok(HazardPrediction {
            leak_severity: self.leak_severity.predict(&row)?,
            fire_risk: self.fire_risk.predict(&row)?,
            flammability: self.flammability.predict(&row)?,
            gas_type: self.gas_type.predict(&row)?,
        })
    }

    /// Predict from a raw reading, using the placeholder calibration the
    /// synthetic table was built with
    pub fn predict_reading(&self, raw: RawReading) -> MlResult<HazardPrediction> {
        self.predict(raw.value() as f64, synthetic_ppm(raw))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> MlResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> MlResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let models: Self = serde_json::from_reader(reader)?;
        for slot in ModelSlot::ALL {
            models.slot(slot).tree.validate()?;
        }
        Ok(models)
    }
}

/// Gas classifier learned from another classifier's decisions
///
/// Fits a one-feature tree on the resistance of every raw reading, labelled
/// by `source`. Plugs into `GasEstimator` wherever the band table does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeGasClassifier {
    encoder: LabelEncoder,
    tree: DecisionTree,
}

impl TreeGasClassifier {
    pub fn fit<C: GasClassifier>(source: &C, converter: &ResistanceConverter) -> MlResult<Self> {
        let mut features = Vec::with_capacity(1024);
        let mut labels = Vec::with_capacity(1024);

        for raw in RawReading::all() {
            let resistance = converter.convert(raw);
            features.push(vec![resistance.capped(UNBOUNDED_DISPLAY_KOHM)]);
            labels.push(source.classify(resistance).name());
        }

        let encoder = LabelEncoder::fit(&labels);
        let targets = encoder.encode_all(&labels)?;
        let mut tree = DecisionTree::default();
        tree.fit(&features, &targets, encoder.len())?;

        Ok(Self { encoder, tree })
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }
}

impl GasClassifier for TreeGasClassifier {
    fn classify(&self, resistance: Resistance) -> GasType {
        let row = [resistance.capped(UNBOUNDED_DISPLAY_KOHM)];
        self.tree
            .predict(&row)
            .ok()
            .and_then(|class| self.encoder.decode(class))
            .and_then(GasType::from_label)
            .unwrap_or(GasType::Unknown)
    }
}
