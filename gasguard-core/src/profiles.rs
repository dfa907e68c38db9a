//! Gas profiles and the calibration catalog
//!
//! A `GasProfile` holds the log-log curve fit for one gas. The catalog is
//! built once and handed to the estimator; lookups borrow from it and never
//! mutate it.

use heapless::Vec;

use crate::constants::buffers::MAX_GAS_PROFILES;
use crate::constants::sensors::*;
use crate::errors::{EstimatorError, EstimatorResult};
use crate::gas::GasType;

/// Log-log calibration curve for one gas
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasProfile {
    /// Gas this curve calibrates
    pub gas: GasType,
    /// Curve slope `m` (negative for MQ sensors)
    pub slope: f64,
    /// Curve intercept `b`
    pub intercept: f64,
}

impl GasProfile {
    /// Profile for `gas` with curve `log10(ratio) = m * log10(ppm) + b`
    pub const fn new(gas: GasType, slope: f64, intercept: f64) -> Self {
        Self { gas, slope, intercept }
    }
}

/// MQ-2 datasheet curves
pub const MQ2_PROFILES: [GasProfile; 6] = [
    GasProfile::new(GasType::Lpg, LPG_CURVE_SLOPE, LPG_CURVE_INTERCEPT),
    GasProfile::new(GasType::Methane, METHANE_CURVE_SLOPE, METHANE_CURVE_INTERCEPT),
    GasProfile::new(GasType::Smoke, SMOKE_CURVE_SLOPE, SMOKE_CURVE_INTERCEPT),
    GasProfile::new(GasType::Co, CO_CURVE_SLOPE, CO_CURVE_INTERCEPT),
    GasProfile::new(GasType::Butane, BUTANE_CURVE_SLOPE, BUTANE_CURVE_INTERCEPT),
    GasProfile::new(GasType::Alcohol, ALCOHOL_CURVE_SLOPE, ALCOHOL_CURVE_INTERCEPT),
];

/// Read-only lookup table from gas to calibration curve
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<GasProfile, MAX_GAS_PROFILES>,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::mq2()
    }
}

impl ProfileCatalog {
    /// Catalog with no curves; every lookup fails
    pub fn empty() -> Self {
        Self { profiles: Vec::new() }
    }

    /// Standard MQ-2 catalog
    pub fn mq2() -> Self {
        let mut profiles = Vec::new();
        for profile in MQ2_PROFILES {
            // MQ2_PROFILES.len() < MAX_GAS_PROFILES
            let _ = profiles.push(profile);
        }
        Self { profiles }
    }

    /// Build a catalog from custom curves
    ///
    /// A later profile for the same gas replaces an earlier one. `Unknown` and
    /// curves with a zero or non-finite slope are rejected.
    pub fn from_profiles(profiles: &[GasProfile]) -> EstimatorResult<Self> {
        let mut catalog = Self::empty();
        for profile in profiles {
            catalog = catalog.with_profile(*profile)?;
        }
        Ok(catalog)
    }

    /// Add or replace one curve
    pub fn with_profile(mut self, profile: GasProfile) -> EstimatorResult<Self> {
        if profile.gas.is_unknown() {
            return Err(EstimatorError::InvalidConfig {
                reason: "Unknown gas cannot carry a calibration curve",
            });
        }
        if !profile.slope.is_finite() || profile.slope == 0.0 || !profile.intercept.is_finite() {
            return Err(EstimatorError::InvalidConfig {
                reason: "curve slope must be non-zero and coefficients finite",
            });
        }

        if let Some(existing) = self.profiles.iter_mut().find(|p| p.gas == profile.gas) {
            *existing = profile;
            return Ok(self);
        }

        self.profiles
            .push(profile)
            .map_err(|_| EstimatorError::CatalogFull { capacity: MAX_GAS_PROFILES })?;
        Ok(self)
    }

    /// Curve for a gas
    pub fn lookup(&self, gas: GasType) -> EstimatorResult<&GasProfile> {
        self.profiles
            .iter()
            .find(|p| p.gas == gas)
            .ok_or(EstimatorError::MissingProfile { gas })
    }

    /// True if `gas` has a curve
    pub fn contains(&self, gas: GasType) -> bool {
        self.lookup(gas).is_ok()
    }

    /// Profiles in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &GasProfile> {
        self.profiles.iter()
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no gas has a curve
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
