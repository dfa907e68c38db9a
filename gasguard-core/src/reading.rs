//! Raw ADC readings
//!
//! A `RawReading` is always inside `[0, ADC_MAX]`. Data sources decide whether
//! an out-of-range value is an error (`new`) or should be clamped
//! (`saturating`); the estimator only ever sees valid readings.

use core::fmt;

use crate::constants::circuit::ADC_MAX;
use crate::errors::{EstimatorError, EstimatorResult};

/// One 10-bit ADC sample from the sensor divider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RawReading(u16);

impl RawReading {
    /// Lowest reading (0 V at the divider output)
    pub const MIN: RawReading = RawReading(0);

    /// Highest reading (divider output at supply voltage)
    pub const MAX: RawReading = RawReading(ADC_MAX);

    /// Validate a value from a data source
    pub fn new(raw: u32) -> EstimatorResult<Self> {
        if raw > ADC_MAX as u32 {
            return Err(EstimatorError::RawOutOfRange { raw, max: ADC_MAX });
        }
        Ok(Self(raw as u16))
    }

    /// Clamp a possibly out-of-range value into the ADC range
    pub fn saturating(raw: i64) -> Self {
        Self(raw.clamp(0, ADC_MAX as i64) as u16)
    }

    /// Underlying ADC count
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Fraction of full scale, in `[0.0, 1.0]`
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / ADC_MAX as f64
    }

    /// Iterate over every possible reading, ascending
    pub fn all() -> impl Iterator<Item = RawReading> {
        (0..=ADC_MAX).map(RawReading)
    }
}

impl TryFrom<u32> for RawReading {
    type Error = EstimatorError;

    fn try_from(raw: u32) -> EstimatorResult<Self> {
        Self::new(raw)
    }
}

impl From<RawReading> for u16 {
    fn from(reading: RawReading) -> u16 {
        reading.0
    }
}

impl fmt::Display for RawReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_adc_range() {
        assert_eq!(RawReading::new(0).unwrap(), RawReading::MIN);
        assert_eq!(RawReading::new(1023).unwrap(), RawReading::MAX);
        assert_eq!(RawReading::new(512).unwrap().value(), 512);
    }

    #[test]
    fn rejects_out_of_range() {
        let err = RawReading::new(1024).unwrap_err();
        assert_eq!(err, EstimatorError::RawOutOfRange { raw: 1024, max: 1023 });
    }

    #[test]
    fn saturating_clamps_both_ends() {
        assert_eq!(RawReading::saturating(-5), RawReading::MIN);
        assert_eq!(RawReading::saturating(5000), RawReading::MAX);
        assert_eq!(RawReading::saturating(300).value(), 300);
    }

    #[test]
    fn all_covers_every_count() {
        assert_eq!(RawReading::all().count(), 1024);
        assert_eq!(RawReading::all().last(), Some(RawReading::MAX));
    }
}
