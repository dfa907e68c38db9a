//! Gas types recognised by the MQ-2 calibration

use core::fmt;

/// Classification outcome for one reading
///
/// `Unknown` is the "air / unknown gas" sentinel: no calibration curve applies
/// and no concentration can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GasType {
    /// Liquefied petroleum gas
    #[cfg_attr(feature = "serde", serde(rename = "LPG"))]
    Lpg,
    /// Carbon monoxide
    #[cfg_attr(feature = "serde", serde(rename = "CO"))]
    Co,
    /// Methane (natural gas)
    Methane,
    /// Combustion smoke
    Smoke,
    /// Butane
    Butane,
    /// Ethanol vapour
    Alcohol,
    /// Air, or no band matched
    Unknown,
}

impl GasType {
    /// Every gas with a calibration curve, in ascending resistance-band order
    pub const CALIBRATED: [GasType; 6] = [
        GasType::Lpg,
        GasType::Co,
        GasType::Methane,
        GasType::Smoke,
        GasType::Butane,
        GasType::Alcohol,
    ];

    /// Display label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lpg => "LPG",
            Self::Co => "CO",
            Self::Methane => "Methane",
            Self::Smoke => "Smoke",
            Self::Butane => "Butane",
            Self::Alcohol => "Alcohol",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a label, case-insensitive. "Air" maps to `Unknown`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let found = Self::CALIBRATED
            .iter()
            .copied()
            .find(|gas| gas.name().eq_ignore_ascii_case(label));

        match found {
            Some(gas) => Some(gas),
            None if label.eq_ignore_ascii_case("unknown") || label.eq_ignore_ascii_case("air") => {
                Some(Self::Unknown)
            }
            None => None,
        }
    }

    /// True for the air/unknown sentinel
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for gas in GasType::CALIBRATED {
            assert_eq!(GasType::from_label(gas.name()), Some(gas));
        }
        assert_eq!(GasType::from_label("lpg"), Some(GasType::Lpg));
        assert_eq!(GasType::from_label(" Air "), Some(GasType::Unknown));
        assert_eq!(GasType::from_label("Propane"), None);
    }

    #[test]
    fn calibrated_excludes_unknown() {
        assert!(!GasType::CALIBRATED.contains(&GasType::Unknown));
        assert!(GasType::Unknown.is_unknown());
    }
}
