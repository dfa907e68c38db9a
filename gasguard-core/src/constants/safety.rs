//! Safety Thresholds
//!
//! Alarm levels used by the leak monitor. Values follow the field firmware
//! that drives the valve, fan and alarm outputs.

/// Lower explosive limit of LPG in air (ppm).
///
/// 2.0% by volume. Below this the mixture is too lean to ignite.
///
/// Source: NFPA 58 / propane safety data sheets
pub const LPG_LOWER_EXPLOSIVE_LIMIT_PPM: f64 = 20_000.0;

/// Fraction of the LEL at which an emergency is declared.
pub const EMERGENCY_LEL_FRACTION: f64 = 0.4;

/// Concentration above which forced ventilation is requested (ppm).
pub const VENTILATION_THRESHOLD_PPM: f64 = 1000.0;

/// Deviation of the drift-window mean from its oldest sample that flags
/// the sensor for recalibration (ppm).
pub const DRIFT_THRESHOLD_PPM: f64 = 15.0;

/// Rise rate above which a high-concentration event looks like LPG/propane
/// (ppm/s).
pub const LPG_PATTERN_MIN_RATE_PPM_PER_S: f64 = 50.0;

/// Rise rate above which a low-concentration event looks like smoke/CO
/// (ppm/s).
pub const SMOKE_PATTERN_MIN_RATE_PPM_PER_S: f64 = 20.0;

/// Concentration separating the LPG and smoke response patterns (ppm).
pub const PATTERN_SPLIT_PPM: f64 = 1000.0;
