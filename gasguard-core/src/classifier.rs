//! Resistance-band gas classifier
//!
//! Bands are ascending and half-open `[lower, upper)`; the first band whose
//! upper bound exceeds the resistance wins. The last MQ-2 band has an infinite
//! upper bound, so the standard table is exhaustive: every finite RS and the
//! unbounded sentinel land in exactly one band.
//!
//! ```rust
//! use gasguard_core::{BandClassifier, GasClassifier, GasType, Resistance};
//!
//! let classifier = BandClassifier::mq2();
//! assert_eq!(classifier.classify(Resistance::Finite(0.5)), GasType::Lpg);
//! assert_eq!(classifier.classify(Resistance::Finite(1.0)), GasType::Co);
//! assert_eq!(classifier.classify(Resistance::Unbounded), GasType::Alcohol);
//! ```

use heapless::Vec;

use crate::constants::buffers::MAX_BANDS;
use crate::constants::sensors::*;
use crate::errors::{EstimatorError, EstimatorResult};
use crate::gas::GasType;
use crate::resistance::Resistance;
use crate::traits::GasClassifier;

/// One resistance band: RS below `upper_kohm` (and above the previous band)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistanceBand {
    /// Exclusive upper bound (kΩ); `f64::INFINITY` for an open-ended band
    pub upper_kohm: f64,
    /// Gas reported for resistances in this band
    pub gas: GasType,
}

impl ResistanceBand {
    /// Band ending just below `upper_kohm`
    pub const fn new(upper_kohm: f64, gas: GasType) -> Self {
        Self { upper_kohm, gas }
    }
}

/// MQ-2 band table, ascending
pub const MQ2_BANDS: [ResistanceBand; 6] = [
    ResistanceBand::new(LPG_BAND_UPPER_KOHM, GasType::Lpg),
    ResistanceBand::new(CO_BAND_UPPER_KOHM, GasType::Co),
    ResistanceBand::new(METHANE_BAND_UPPER_KOHM, GasType::Methane),
    ResistanceBand::new(SMOKE_BAND_UPPER_KOHM, GasType::Smoke),
    ResistanceBand::new(BUTANE_BAND_UPPER_KOHM, GasType::Butane),
    ResistanceBand::new(f64::INFINITY, GasType::Alcohol),
];

/// Classifier over an ascending band table
#[derive(Debug, Clone)]
pub struct BandClassifier {
    bands: Vec<ResistanceBand, MAX_BANDS>,
}

impl Default for BandClassifier {
    fn default() -> Self {
        Self::mq2()
    }
}

impl BandClassifier {
    /// Standard MQ-2 bands
    pub fn mq2() -> Self {
        let mut bands = Vec::new();
        for band in MQ2_BANDS {
            let _ = bands.push(band);
        }
        Self { bands }
    }

    /// Custom band table
    ///
    /// Upper bounds must be strictly ascending and not NaN. A table whose last
    /// bound is finite leaves high resistances unclassified (`Unknown`).
    pub fn from_bands(bands: &[ResistanceBand]) -> EstimatorResult<Self> {
        if bands.is_empty() {
            return Err(EstimatorError::InvalidConfig {
                reason: "band table is empty",
            });
        }
        if bands.iter().any(|b| b.upper_kohm.is_nan() || b.upper_kohm <= 0.0) {
            return Err(EstimatorError::InvalidConfig {
                reason: "band bounds must be positive",
            });
        }
        if bands.windows(2).any(|w| w[0].upper_kohm >= w[1].upper_kohm) {
            return Err(EstimatorError::InvalidConfig {
                reason: "band bounds must be strictly ascending",
            });
        }

        let mut table = Vec::new();
        for band in bands {
            table
                .push(*band)
                .map_err(|_| EstimatorError::InvalidConfig { reason: "too many bands" })?;
        }
        Ok(Self { bands: table })
    }

    /// True when every resistance maps to a band
    pub fn is_exhaustive(&self) -> bool {
        self.bands
            .last()
            .map(|b| b.upper_kohm == f64::INFINITY)
            .unwrap_or(false)
    }

    /// Bands in ascending order
    pub fn bands(&self) -> &[ResistanceBand] {
        &self.bands
    }
}

impl GasClassifier for BandClassifier {
    fn classify(&self, resistance: Resistance) -> GasType {
        match resistance {
            Resistance::Unbounded => {
                if self.is_exhaustive() {
                    self.bands.last().map(|b| b.gas).unwrap_or(GasType::Unknown)
                } else {
                    GasType::Unknown
                }
            }
            Resistance::Finite(rs) => self
                .bands
                .iter()
                .find(|band| rs < band.upper_kohm)
                .map(|band| band.gas)
                .unwrap_or(GasType::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(rs: f64) -> GasType {
        BandClassifier::mq2().classify(Resistance::Finite(rs))
    }

    #[test]
    fn band_interiors() {
        assert_eq!(classify(0.0), GasType::Lpg);
        assert_eq!(classify(0.5), GasType::Lpg);
        assert_eq!(classify(2.5), GasType::Co);
        assert_eq!(classify(7.0), GasType::Methane);
        assert_eq!(classify(15.0), GasType::Smoke);
        assert_eq!(classify(25.0), GasType::Butane);
        assert_eq!(classify(1000.0), GasType::Alcohol);
    }

    #[test]
    fn band_boundaries_are_half_open() {
        assert_eq!(classify(1.0), GasType::Co);
        assert_eq!(classify(5.0), GasType::Methane);
        assert_eq!(classify(10.0), GasType::Smoke);
        assert_eq!(classify(20.0), GasType::Butane);
        assert_eq!(classify(30.0), GasType::Alcohol);
        assert_eq!(classify(0.999_999), GasType::Lpg);
        assert_eq!(classify(29.999_999), GasType::Butane);
    }

    #[test]
    fn unbounded_is_alcohol() {
        let classifier = BandClassifier::mq2();
        assert!(classifier.is_exhaustive());
        assert_eq!(classifier.classify(Resistance::Unbounded), GasType::Alcohol);
    }

    #[test]
    fn partial_table_yields_unknown() {
        let classifier = BandClassifier::from_bands(&[
            ResistanceBand::new(1.0, GasType::Lpg),
            ResistanceBand::new(5.0, GasType::Co),
        ])
        .unwrap();

        assert!(!classifier.is_exhaustive());
        assert_eq!(classifier.classify(Resistance::Finite(3.0)), GasType::Co);
        assert_eq!(classifier.classify(Resistance::Finite(6.0)), GasType::Unknown);
        assert_eq!(classifier.classify(Resistance::Unbounded), GasType::Unknown);
    }

    #[test]
    fn rejects_unordered_tables() {
        let result = BandClassifier::from_bands(&[
            ResistanceBand::new(5.0, GasType::Co),
            ResistanceBand::new(1.0, GasType::Lpg),
        ]);
        assert!(result.is_err());
        assert!(BandClassifier::from_bands(&[]).is_err());
    }
}
