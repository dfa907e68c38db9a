//! Training data
//!
//! Two sources are supported:
//!
//! - a synthetic table covering every raw reading (0..=1023), labelled with
//!   the same cutoffs the rule-based hazard rating uses
//! - the MQ multi-sensor measurement CSV (`MQ2,MQ3,...,MQ135,Gas`)
//!
//! A `Dataset` is column-oriented for labels: several label columns can
//! share one feature matrix, which is how the four hazard models are
//! trained from a single table.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use gasguard_core::constants::sensors::{HAZARD_LOW_UPPER_RAW, HAZARD_MODERATE_UPPER_RAW};
use gasguard_core::{HazardDimension, HazardLevel, RawReading};

use crate::{MlError, MlResult, Rng};

/// Sensor columns of the MQ measurement table, in feature order
pub const MQ_SENSOR_COLUMNS: [&str; 7] = ["MQ2", "MQ3", "MQ5", "MQ6", "MQ7", "MQ8", "MQ135"];

/// Label column of the MQ measurement table
pub const MQ_GAS_COLUMN: &str = "Gas";

/// Feature names of the synthetic MQ-2 table
pub const SYNTHETIC_FEATURES: [&str; 2] = ["sensor_reading", "ppm"];

/// Label column holding the gas type
pub const GAS_TYPE_COLUMN: &str = "gas_type";

/// Placeholder calibration used to generate the synthetic table
///
/// A piecewise-linear stand-in for a real curve, kept so models trained on
/// the synthetic table see the same `ppm` feature at prediction time.
pub fn synthetic_ppm(raw: RawReading) -> f64 {
    let value = raw.value();
    let scale = if value < HAZARD_LOW_UPPER_RAW {
        0.1
    } else if value < HAZARD_MODERATE_UPPER_RAW {
        0.2
    } else {
        0.3
    };
    value as f64 * scale
}

/// Gas label the synthetic table assigns to a raw reading
fn synthetic_gas(raw: RawReading) -> &'static str {
    match HazardLevel::from_raw(raw) {
        HazardLevel::Low => "Methane",
        HazardLevel::Moderate => "Butane",
        HazardLevel::High => "Air",
    }
}

/// One named label column
#[derive(Debug, Clone, PartialEq)]
pub struct LabelColumn {
    pub name: String,
    pub values: Vec<String>,
}

/// Outcome of loading a CSV file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvSummary {
    pub rows: usize,
    pub skipped: usize,
}

/// Feature matrix with one or more label columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<LabelColumn>,
}

impl Dataset {
    /// Build from parts; every label column must have one value per row
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<LabelColumn>,
    ) -> MlResult<Self> {
        let width = feature_names.len();
        if let Some(row) = features.iter().find(|r| r.len() != width) {
            return Err(MlError::FeatureMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        if labels.iter().any(|c| c.values.len() != features.len()) {
            return Err(MlError::InvalidConfig("label column length differs from row count"));
        }

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Every raw reading 0..=1023 with `[sensor_reading, ppm]` features and
    /// labels for leak severity, fire risk, flammability and gas type
    pub fn synthetic_mq2() -> Self {
        let readings: Vec<RawReading> = RawReading::all().collect();

        let features = readings
            .iter()
            .map(|&raw| vec![raw.value() as f64, synthetic_ppm(raw)])
            .collect();

        let mut labels: Vec<LabelColumn> = HazardDimension::ALL
            .iter()
            .map(|dimension| LabelColumn {
                name: dimension.key().to_string(),
                values: readings
                    .iter()
                    .map(|&raw| dimension.level_label(HazardLevel::from_raw(raw)).to_string())
                    .collect(),
            })
            .collect();

        labels.push(LabelColumn {
            name: GAS_TYPE_COLUMN.to_string(),
            values: readings.iter().map(|&raw| synthetic_gas(raw).to_string()).collect(),
        });

        Self {
            feature_names: SYNTHETIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            features,
            labels,
        }
    }

    /// Load the MQ measurement table from a file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> MlResult<(Self, CsvSummary)> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Load the MQ measurement table from any reader
    ///
    /// The gas label is the part after the first `_` (`"Mixture_LPG"` ->
    /// `"LPG"`), or the whole value when there is none. Rows with a
    /// non-numeric sensor value or a missing field are skipped and counted.
    pub fn from_csv_reader<R: BufRead>(reader: R) -> MlResult<(Self, CsvSummary)> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(MlError::InsufficientData("CSV file is empty")),
        };
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let find = |name: &str| {
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| MlError::MissingColumn(name.to_string()))
        };
        let sensor_idx = MQ_SENSOR_COLUMNS
            .iter()
            .map(|name| find(*name))
            .collect::<MlResult<Vec<usize>>>()?;
        let gas_idx = find(MQ_GAS_COLUMN)?;

        let mut features = Vec::new();
        let mut gases = Vec::new();
        let mut summary = CsvSummary::default();

        for (line_no, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match parse_row(&fields, &sensor_idx, gas_idx) {
                Some((row, gas)) => {
                    features.push(row);
                    gases.push(gas);
                    summary.rows += 1;
                }
                None => {
                    log::debug!("skipping malformed CSV row {}", line_no + 2);
                    summary.skipped += 1;
                }
            }
        }

        if summary.skipped > 0 {
            log::warn!("skipped {} malformed rows", summary.skipped);
        }
        if features.is_empty() {
            return Err(MlError::InsufficientData("no valid rows in CSV"));
        }

        let dataset = Self::new(
            MQ_SENSOR_COLUMNS.iter().map(|s| s.to_string()).collect(),
            features,
            vec![LabelColumn {
                name: MQ_GAS_COLUMN.to_string(),
                values: gases,
            }],
        )?;

        Ok((dataset, summary))
    }

    /// Shuffle with `seed` and split off `test_fraction` of the rows
    ///
    /// The test set size is rounded up, as long as both halves keep at
    /// least one row.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> MlResult<(Self, Self)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(MlError::InvalidConfig("test_fraction must be in (0, 1)"));
        }
        if self.len() < 2 {
            return Err(MlError::InsufficientData("need at least two rows to split"));
        }

        let n_test = ((self.len() as f64 * test_fraction).ceil() as usize).clamp(1, self.len() - 1);

        let mut order: Vec<usize> = (0..self.len()).collect();
        Rng::new(seed).shuffle(&mut order);

        let (test, train) = order.split_at(n_test);
        Ok((self.subset(train), self.subset(test)))
    }

    /// Rows at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: self
                .labels
                .iter()
                .map(|column| LabelColumn {
                    name: column.name.clone(),
                    values: indices.iter().map(|&i| column.values[i].clone()).collect(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn label_columns(&self) -> &[LabelColumn] {
        &self.labels
    }

    /// Values of a label column
    pub fn labels(&self, name: &str) -> MlResult<&[String]> {
        self.labels
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| MlError::MissingColumn(name.to_string()))
    }
}

fn parse_row(fields: &[&str], sensor_idx: &[usize], gas_idx: usize) -> Option<(Vec<f64>, String)> {
    let row = sensor_idx
        .iter()
        .map(|&i| fields.get(i)?.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()?;

    let gas: &str = fields.get(gas_idx).copied().filter(|g| !g.is_empty())?;
    let label = gas.split('_').nth(1).filter(|s| !s.is_empty()).unwrap_or(gas);

    Some((row, label.to_string()))
}
