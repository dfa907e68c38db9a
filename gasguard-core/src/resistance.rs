//! Raw reading to sensor resistance
//!
//! ## Divider model
//!
//! ```text
//! V_out = (raw / 1023) * V_in
//! RS    = (V_in - V_out) / V_out
//! ```
//!
//! At `raw = 0` the output voltage is exactly zero and RS has no finite value.
//! That case is represented by `Resistance::Unbounded` instead of a division
//! by zero or a NaN. At `raw = 1023` the output equals the supply and RS is 0.
//!
//! RS is non-increasing in `raw`: more voltage across the load means less
//! across the sensor.

use core::cmp::Ordering;
use core::fmt;

use crate::config::EstimatorConfig;
use crate::errors::{EstimatorError, EstimatorResult};
use crate::reading::RawReading;

/// Sensor resistance in kΩ, or unbounded when the divider output is 0 V
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resistance {
    /// Finite, non-negative resistance (kΩ)
    Finite(f64),
    /// Output voltage was zero
    Unbounded,
}

impl Resistance {
    /// Finite value, or `ZeroVoltage` for the unbounded sentinel
    pub fn finite(&self) -> EstimatorResult<f64> {
        match self {
            Self::Finite(kohm) => Ok(*kohm),
            Self::Unbounded => Err(EstimatorError::ZeroVoltage),
        }
    }

    /// True when the divider output was 0 V
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Value as `f64`, with `Unbounded` mapped to `f64::INFINITY`
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Finite(kohm) => *kohm,
            Self::Unbounded => f64::INFINITY,
        }
    }

    /// Value capped for display or plotting
    pub fn capped(&self, cap: f64) -> f64 {
        self.as_f64().min(cap)
    }
}

impl PartialOrd for Resistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_f64().partial_cmp(&other.as_f64())
    }
}

impl fmt::Display for Resistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(kohm) => write!(f, "{:.4} kOhm", kohm),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Resistance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(kohm) => serializer.serialize_f64(*kohm),
            Self::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

/// Converts ADC counts to sensor resistance for one divider circuit
#[derive(Debug, Clone, Copy)]
pub struct ResistanceConverter {
    supply_voltage_v: f64,
}

impl Default for ResistanceConverter {
    fn default() -> Self {
        Self::new(&EstimatorConfig::default())
    }
}

impl ResistanceConverter {
    /// Converter for the supply voltage in `config`
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            supply_voltage_v: config.supply_voltage_v,
        }
    }

    /// Divider output voltage (V)
    pub fn output_voltage(&self, raw: RawReading) -> f64 {
        raw.fraction() * self.supply_voltage_v
    }

    /// Sensor resistance (kΩ)
    pub fn convert(&self, raw: RawReading) -> Resistance {
        let v_out = self.output_voltage(raw);

        if v_out == 0.0 {
            return Resistance::Unbounded;
        }

        // v_out <= supply for every valid reading, so this never goes negative
        let rs = (self.supply_voltage_v - v_out) / v_out;
        Resistance::Finite(rs.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: u32) -> RawReading {
        RawReading::new(value).unwrap()
    }

    #[test]
    fn zero_reading_is_unbounded() {
        let converter = ResistanceConverter::default();
        assert_eq!(converter.convert(raw(0)), Resistance::Unbounded);
        assert_eq!(converter.convert(raw(0)).finite(), Err(EstimatorError::ZeroVoltage));
    }

    #[test]
    fn full_scale_is_zero_resistance() {
        let converter = ResistanceConverter::default();
        assert_eq!(converter.output_voltage(raw(1023)), 12.0);
        assert_eq!(converter.convert(raw(1023)), Resistance::Finite(0.0));
    }

    #[test]
    fn mid_scale_reading() {
        let converter = ResistanceConverter::default();
        let v_out = converter.output_voltage(raw(500));
        assert!((v_out - 5.8651).abs() < 1e-4);

        let rs = converter.convert(raw(500)).finite().unwrap();
        assert!((rs - 1.046).abs() < 1e-9);
    }

    #[test]
    fn unbounded_orders_above_finite() {
        assert!(Resistance::Unbounded > Resistance::Finite(1e12));
        assert_eq!(Resistance::Unbounded.capped(1e6), 1e6);
        assert_eq!(Resistance::Finite(3.0).capped(1e6), 3.0);
    }
}
