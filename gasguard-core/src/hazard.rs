//! Rule-based hazard rating
//!
//! Three hazard dimensions are rated from the raw sensor count using the same
//! cutoffs the training labels were generated with. The dimensions are a
//! fixed enum, not string keys, so a typo is a compile error.

use core::fmt;

use crate::constants::safety::{
    EMERGENCY_LEL_FRACTION, LPG_LOWER_EXPLOSIVE_LIMIT_PPM, VENTILATION_THRESHOLD_PPM,
};
use crate::constants::sensors::{HAZARD_LOW_UPPER_RAW, HAZARD_MODERATE_UPPER_RAW};
use crate::reading::RawReading;

/// Hazard dimension rated for each reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HazardDimension {
    /// How much gas is escaping
    LeakSeverity,
    /// Likelihood of ignition
    FireRisk,
    /// How readily the mixture burns
    Flammability,
}

impl HazardDimension {
    /// Every dimension, in report order
    pub const ALL: [HazardDimension; 3] = [
        HazardDimension::LeakSeverity,
        HazardDimension::FireRisk,
        HazardDimension::Flammability,
    ];

    /// Snake-case key, as used in dataset headers
    pub fn key(&self) -> &'static str {
        match self {
            Self::LeakSeverity => "leak_severity",
            Self::FireRisk => "fire_risk",
            Self::Flammability => "flammability",
        }
    }

    /// Label for a level on this dimension
    ///
    /// Fire risk calls the middle level "Medium"; the others say "Moderate".
    pub fn level_label(&self, level: HazardLevel) -> &'static str {
        match (self, level) {
            (_, HazardLevel::Low) => "Low",
            (Self::FireRisk, HazardLevel::Moderate) => "Medium",
            (_, HazardLevel::Moderate) => "Moderate",
            (_, HazardLevel::High) => "High",
        }
    }
}

impl fmt::Display for HazardDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Three-step hazard level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HazardLevel {
    /// Below the lower raw cutoff
    Low,
    /// Between the two raw cutoffs
    Moderate,
    /// At or above the upper raw cutoff
    High,
}

impl HazardLevel {
    /// Every level, lowest first
    pub const ALL: [HazardLevel; 3] = [HazardLevel::Low, HazardLevel::Moderate, HazardLevel::High];

    /// Rate a raw reading
    pub fn from_raw(raw: RawReading) -> Self {
        let value = raw.value();
        if value < HAZARD_LOW_UPPER_RAW {
            Self::Low
        } else if value < HAZARD_MODERATE_UPPER_RAW {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Parse either wording of the middle level
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("low") {
            Some(Self::Low)
        } else if label.eq_ignore_ascii_case("moderate") || label.eq_ignore_ascii_case("medium") {
            Some(Self::Moderate)
        } else if label.eq_ignore_ascii_case("high") {
            Some(Self::High)
        } else {
            None
        }
    }
}

/// Levels for every dimension of one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HazardAssessment {
    /// Leak severity level
    pub leak_severity: HazardLevel,
    /// Fire risk level
    pub fire_risk: HazardLevel,
    /// Flammability level
    pub flammability: HazardLevel,
}

impl HazardAssessment {
    /// Rule-based rating from the raw count
    pub fn from_raw(raw: RawReading) -> Self {
        let level = HazardLevel::from_raw(raw);
        Self {
            leak_severity: level,
            fire_risk: level,
            flammability: level,
        }
    }

    /// Level on one dimension
    pub fn level(&self, dimension: HazardDimension) -> HazardLevel {
        match dimension {
            HazardDimension::LeakSeverity => self.leak_severity,
            HazardDimension::FireRisk => self.fire_risk,
            HazardDimension::Flammability => self.flammability,
        }
    }

    /// Highest level across dimensions
    pub fn worst(&self) -> HazardLevel {
        self.leak_severity.max(self.fire_risk).max(self.flammability)
    }
}

/// True when a concentration calls for an emergency shutdown
pub fn is_emergency(ppm: f64) -> bool {
    ppm > LPG_LOWER_EXPLOSIVE_LIMIT_PPM * EMERGENCY_LEL_FRACTION
}

/// True when a concentration calls for forced ventilation
pub fn needs_ventilation(ppm: f64) -> bool {
    ppm > VENTILATION_THRESHOLD_PPM
}
