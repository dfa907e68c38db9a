//! Estimator configuration
//!
//! Circuit and calibration constants are passed in explicitly rather than
//! read from globals, so two sensors on different rails can share a process.

use crate::constants::circuit::{
    DEFAULT_BASELINE_R0_KOHM, DEFAULT_LOAD_RESISTANCE_KOHM, DEFAULT_SUPPLY_VOLTAGE_V,
};
use crate::errors::{EstimatorError, EstimatorResult};

/// Circuit and calibration constants for one sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Supply voltage across the divider (V)
    pub supply_voltage_v: f64,

    /// Divider load resistance (kΩ)
    ///
    /// Not used by the resistance formula, which computes
    /// `(V_in - V_out) / V_out` without scaling by the load. Kept so that a
    /// load-scaled formula can be selected later without a config change.
    pub load_resistance_kohm: f64,

    /// Sensor resistance in clean air (kΩ)
    pub baseline_r0_kohm: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            supply_voltage_v: DEFAULT_SUPPLY_VOLTAGE_V,
            load_resistance_kohm: DEFAULT_LOAD_RESISTANCE_KOHM,
            baseline_r0_kohm: DEFAULT_BASELINE_R0_KOHM,
        }
    }
}

impl EstimatorConfig {
    /// Create configuration with custom supply voltage and baseline
    pub fn new(supply_voltage_v: f64, baseline_r0_kohm: f64) -> EstimatorResult<Self> {
        let config = Self {
            supply_voltage_v,
            baseline_r0_kohm,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the load resistance (kΩ)
    pub fn with_load_resistance(mut self, load_resistance_kohm: f64) -> Self {
        self.load_resistance_kohm = load_resistance_kohm;
        self
    }

    /// Reject constants the formulas cannot use
    pub fn validate(&self) -> EstimatorResult<()> {
        if !(self.supply_voltage_v.is_finite() && self.supply_voltage_v > 0.0) {
            return Err(EstimatorError::InvalidConfig {
                reason: "supply voltage must be positive and finite",
            });
        }
        if !(self.baseline_r0_kohm.is_finite() && self.baseline_r0_kohm > 0.0) {
            return Err(EstimatorError::InvalidConfig {
                reason: "baseline R0 must be positive and finite",
            });
        }
        if !(self.load_resistance_kohm.is_finite() && self.load_resistance_kohm > 0.0) {
            return Err(EstimatorError::InvalidConfig {
                reason: "load resistance must be positive and finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bench_rig() {
        let config = EstimatorConfig::default();
        assert_eq!(config.supply_voltage_v, 12.0);
        assert_eq!(config.load_resistance_kohm, 10.0);
        assert_eq!(config.baseline_r0_kohm, 0.4388);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_constants() {
        assert!(EstimatorConfig::new(0.0, 0.4388).is_err());
        assert!(EstimatorConfig::new(5.0, -1.0).is_err());
        assert!(EstimatorConfig::new(f64::NAN, 0.4388).is_err());
        assert!(EstimatorConfig::default()
            .with_load_resistance(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn custom_rail() {
        let config = EstimatorConfig::new(5.0, 9.83).unwrap();
        assert_eq!(config.supply_voltage_v, 5.0);
        assert_eq!(config.baseline_r0_kohm, 9.83);
    }
}
