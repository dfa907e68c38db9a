//! Circuit Constants for the MQ-Series Front End
//!
//! The sensor sits in a voltage divider read by a 10-bit ADC. Defaults match
//! the bench rig the calibration curves were fitted on.

/// Largest value a 10-bit ADC can report.
///
/// A reading of `ADC_MAX` means the divider output equals the supply voltage.
pub const ADC_MAX: u16 = 1023;

/// Supply voltage across the divider (V).
///
/// The MQ-2 heater board on the bench rig runs from a 12 V rail.
pub const DEFAULT_SUPPLY_VOLTAGE_V: f64 = 12.0;

/// Load resistance of the divider (kΩ).
///
/// Carried in configuration for completeness. The resistance formula in
/// `resistance` does not use it; see `EstimatorConfig::load_resistance_kohm`.
pub const DEFAULT_LOAD_RESISTANCE_KOHM: f64 = 10.0;

/// Sensor resistance in clean air (kΩ).
///
/// Measured offline after burn-in, in fresh air.
pub const DEFAULT_BASELINE_R0_KOHM: f64 = 0.4388;

/// Stand-in for an unbounded resistance where a finite number is needed
/// (tables, plots, model features), in kΩ.
pub const UNBOUNDED_DISPLAY_KOHM: f64 = 1.0e6;
