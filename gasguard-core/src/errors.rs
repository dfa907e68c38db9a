//! Error Types for the Gas Estimator
//!
//! Errors are kept small and `Copy`: they are produced once per raw reading
//! and are usually recovered on the spot rather than propagated.
//!
//! ## Error Categories
//!
//! ### Numeric domain
//! - `ZeroVoltage`: raw reading of 0, the divider output is 0 V and sensor
//!   resistance has no finite value
//! - `InvalidRatio`: `RS / R0 <= 0`, the log-log curve is undefined
//!
//! ### Configuration
//! - `MissingProfile`: the classifier produced a gas the catalog has no curve for
//! - `InvalidConfig`: non-positive or non-finite circuit constants
//! - `CatalogFull`: more profiles than the fixed catalog capacity
//!
//! ### Input
//! - `RawOutOfRange`: reading outside the 10-bit ADC range
//!
//! The estimator never surfaces the first three to its caller. They are turned
//! into sentinel values on the result record so that one bad reading cannot
//! stop a monitoring loop:
//!
//! ```rust
//! use gasguard_core::{GasEstimator, Concentration, RawReading};
//!
//! let estimator = GasEstimator::default();
//! let estimate = estimator.estimate(RawReading::new(1023)?);
//!
//! // RS = 0 gives ratio 0, the curve is undefined there
//! assert_eq!(estimate.concentration, Concentration::Invalid);
//! # Ok::<(), gasguard_core::EstimatorError>(())
//! ```

use crate::gas::GasType;
use thiserror_no_std::Error;

/// Result type for estimator operations
pub type EstimatorResult<T> = Result<T, EstimatorError>;

/// Estimator errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EstimatorError {
    /// Divider output is exactly 0 V, resistance is unbounded
    #[error("Output voltage is zero, sensor resistance is unbounded")]
    ZeroVoltage,

    /// Resistance ratio outside the domain of log10
    #[error("Resistance ratio RS/R0 = {ratio} is not positive")]
    InvalidRatio {
        /// The offending RS/R0 value
        ratio: f64,
    },

    /// No calibration curve for the classified gas
    #[error("No gas profile registered for {gas}")]
    MissingProfile {
        /// Gas reported by the classifier
        gas: GasType,
    },

    /// Raw ADC value outside [0, max]
    #[error("Raw reading {raw} outside ADC range [0, {max}]")]
    RawOutOfRange {
        /// The raw value as delivered by the data source
        raw: u32,
        /// Largest representable ADC value
        max: u16,
    },

    /// Circuit or calibration constant rejected
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it
        reason: &'static str,
    },

    /// Catalog has no room for another profile
    #[error("Profile catalog full: capacity {capacity}")]
    CatalogFull {
        /// Fixed catalog capacity
        capacity: usize,
    },
}

impl EstimatorError {
    /// True for errors the estimator recovers into a sentinel value
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ZeroVoltage | Self::InvalidRatio { .. } | Self::MissingProfile { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_are_recoverable() {
        assert!(EstimatorError::ZeroVoltage.is_recoverable());
        assert!(EstimatorError::InvalidRatio { ratio: 0.0 }.is_recoverable());
        assert!(EstimatorError::MissingProfile { gas: GasType::Unknown }.is_recoverable());
        assert!(!EstimatorError::InvalidConfig { reason: "bad" }.is_recoverable());
        assert!(!EstimatorError::RawOutOfRange { raw: 2000, max: 1023 }.is_recoverable());
    }

    #[cfg(feature = "std")]
    #[test]
    fn messages_carry_context() {
        let err = EstimatorError::RawOutOfRange { raw: 4096, max: 1023 };
        assert_eq!(err.to_string(), "Raw reading 4096 outside ADC range [0, 1023]");

        let err = EstimatorError::MissingProfile { gas: GasType::Butane };
        assert_eq!(err.to_string(), "No gas profile registered for Butane");
    }
}
