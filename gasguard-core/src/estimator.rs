//! Reading-to-estimate pipeline
//!
//! `GasEstimator::estimate` runs the whole chain for one raw reading:
//!
//! ```text
//! RawReading ─► ResistanceConverter ─► GasClassifier ─► ProfileCatalog ─► estimate_ppm
//!                    │                      │                 │                │
//!                    ▼                      ▼                 ▼                ▼
//!              Unbounded at 0 V       one GasType      MissingProfile     InvalidRatio
//! ```
//!
//! Every failure along the way is recovered into a sentinel on the returned
//! `Estimate`; the call itself cannot fail. Nothing is cached between calls.

use core::fmt;

use crate::classifier::BandClassifier;
use crate::concentration;
use crate::config::EstimatorConfig;
use crate::errors::{EstimatorError, EstimatorResult};
use crate::gas::GasType;
use crate::profiles::ProfileCatalog;
use crate::reading::RawReading;
use crate::resistance::{Resistance, ResistanceConverter};
use crate::traits::GasClassifier;

/// Concentration outcome for one reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Concentration {
    /// Calibrated concentration (ppm)
    Ppm(f64),
    /// Resistance ratio outside the curve's domain
    Invalid,
    /// No calibration curve for the classified gas
    Unavailable,
}

impl Concentration {
    /// Concentration in ppm, if one was computed
    pub fn ppm(&self) -> Option<f64> {
        match self {
            Self::Ppm(ppm) => Some(*ppm),
            _ => None,
        }
    }

    /// True for a computed concentration
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Ppm(_))
    }
}

impl fmt::Display for Concentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ppm(ppm) => write!(f, "{:.2} PPM", ppm),
            Self::Invalid => f.write_str("invalid"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Concentration {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ppm(ppm) => serializer.serialize_f64(*ppm),
            Self::Invalid => serializer.serialize_str("invalid"),
            Self::Unavailable => serializer.serialize_str("unavailable"),
        }
    }
}

/// Result record for one raw reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Estimate {
    /// Reading the estimate was derived from
    #[cfg_attr(feature = "serde", serde(skip))]
    pub raw: RawReading,
    /// Most likely gas
    pub gas_type: GasType,
    /// Sensor resistance, serialized as `resistance_kohm`
    #[cfg_attr(feature = "serde", serde(rename = "resistance_kohm"))]
    pub resistance: Resistance,
    /// Concentration, serialized as `concentration_ppm`
    #[cfg_attr(feature = "serde", serde(rename = "concentration_ppm"))]
    pub concentration: Concentration,
}

/// Gas identification and concentration estimator
///
/// Holds immutable configuration only; `estimate` takes `&self` and can be
/// shared freely.
#[derive(Debug, Clone)]
pub struct GasEstimator<C = BandClassifier> {
    config: EstimatorConfig,
    converter: ResistanceConverter,
    classifier: C,
    catalog: ProfileCatalog,
}

impl Default for GasEstimator<BandClassifier> {
    fn default() -> Self {
        Self {
            config: EstimatorConfig::default(),
            converter: ResistanceConverter::default(),
            classifier: BandClassifier::mq2(),
            catalog: ProfileCatalog::mq2(),
        }
    }
}

impl GasEstimator<BandClassifier> {
    /// MQ-2 bands and curves with custom circuit constants
    pub fn new(config: EstimatorConfig) -> EstimatorResult<Self> {
        Self::with_parts(config, BandClassifier::mq2(), ProfileCatalog::mq2())
    }
}

impl<C: GasClassifier> GasEstimator<C> {
    /// Estimator from explicit classifier and catalog
    pub fn with_parts(
        config: EstimatorConfig,
        classifier: C,
        catalog: ProfileCatalog,
    ) -> EstimatorResult<Self> {
        config.validate()?;
        Ok(Self {
            converter: ResistanceConverter::new(&config),
            config,
            classifier,
            catalog,
        })
    }

    /// Circuit configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Calibration curves in use
    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Gas classifier in use
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Sensor resistance for a reading
    pub fn resistance(&self, raw: RawReading) -> Resistance {
        self.converter.convert(raw)
    }

    /// Full pipeline for one reading
    pub fn estimate(&self, raw: RawReading) -> Estimate {
        let resistance = self.converter.convert(raw);
        if resistance.is_unbounded() {
            log_debug!("raw {}: {}", raw, EstimatorError::ZeroVoltage);
        }

        let gas_type = self.classifier.classify(resistance);

        let profile = match self.catalog.lookup(gas_type) {
            Ok(profile) => profile,
            Err(err) => {
                log_warn!("raw {}: {}, reporting air/unknown", raw, err);
                return Estimate {
                    raw,
                    gas_type: GasType::Unknown,
                    resistance,
                    concentration: Concentration::Unavailable,
                };
            }
        };

        let concentration =
            match concentration::estimate_ppm(resistance, self.config.baseline_r0_kohm, profile) {
                Ok(ppm) => Concentration::Ppm(ppm),
                Err(err) => {
                    log_debug!("raw {}: {}, skipping PPM", raw, err);
                    Concentration::Invalid
                }
            };

        Estimate {
            raw,
            gas_type,
            resistance,
            concentration,
        }
    }

    /// Concentration of a specific gas, bypassing classification
    pub fn estimate_as(&self, raw: RawReading, gas: GasType) -> EstimatorResult<f64> {
        let profile = self.catalog.lookup(gas)?;
        concentration::estimate_ppm(
            self.converter.convert(raw),
            self.config.baseline_r0_kohm,
            profile,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ResistanceBand;

    fn raw(value: u32) -> RawReading {
        RawReading::new(value).unwrap()
    }

    #[test]
    fn mid_scale_reading_is_co() {
        let estimate = GasEstimator::default().estimate(raw(500));
        assert_eq!(estimate.gas_type, GasType::Co);

        let rs = estimate.resistance.finite().unwrap();
        assert!((rs - 1.046).abs() < 1e-9);

        let ppm = estimate.concentration.ppm().unwrap();
        assert!((ppm - 408.33).abs() < 0.01);
    }

    #[test]
    fn full_scale_reading_is_lpg_without_concentration() {
        let estimate = GasEstimator::default().estimate(raw(1023));
        assert_eq!(estimate.gas_type, GasType::Lpg);
        assert_eq!(estimate.resistance, Resistance::Finite(0.0));
        assert_eq!(estimate.concentration, Concentration::Invalid);
    }

    #[test]
    fn zero_reading_is_alcohol_at_zero_ppm() {
        let estimate = GasEstimator::default().estimate(raw(0));
        assert_eq!(estimate.gas_type, GasType::Alcohol);
        assert_eq!(estimate.resistance, Resistance::Unbounded);
        assert_eq!(estimate.concentration, Concentration::Ppm(0.0));
    }

    #[test]
    fn missing_profile_reports_unknown() {
        let catalog = ProfileCatalog::empty()
            .with_profile(crate::profiles::MQ2_PROFILES[0])
            .unwrap();
        let estimator =
            GasEstimator::with_parts(EstimatorConfig::default(), BandClassifier::mq2(), catalog)
                .unwrap();

        let estimate = estimator.estimate(raw(500));
        assert_eq!(estimate.gas_type, GasType::Unknown);
        assert_eq!(estimate.concentration, Concentration::Unavailable);
        assert!(estimate.resistance.finite().is_ok());
    }

    #[test]
    fn gap_in_bands_reports_unknown() {
        let bands = BandClassifier::from_bands(&[ResistanceBand::new(1.0, GasType::Lpg)]).unwrap();
        let estimator =
            GasEstimator::with_parts(EstimatorConfig::default(), bands, ProfileCatalog::mq2())
                .unwrap();

        let estimate = estimator.estimate(raw(100));
        assert_eq!(estimate.gas_type, GasType::Unknown);
        assert_eq!(estimate.concentration, Concentration::Unavailable);
    }

    #[test]
    fn estimate_as_specific_gas() {
        let estimator = GasEstimator::default();
        let co = estimator.estimate_as(raw(500), GasType::Co).unwrap();
        assert!((co - 408.33).abs() < 0.01);

        assert_eq!(
            estimator.estimate_as(raw(500), GasType::Unknown),
            Err(EstimatorError::MissingProfile { gas: GasType::Unknown })
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EstimatorConfig {
            baseline_r0_kohm: 0.0,
            ..EstimatorConfig::default()
        };
        assert!(GasEstimator::new(config).is_err());
    }
}
