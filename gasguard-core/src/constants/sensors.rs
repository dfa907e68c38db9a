//! MQ-2 Gas Identification Bands and Calibration Curves
//!
//! ## Resistance bands
//!
//! Gas identification uses ascending, half-open bands over sensor resistance
//! RS (kΩ). Each constant is the exclusive upper bound of its band; the last
//! band (Alcohol) is open-ended.
//!
//! ```text
//!   0 ──── 1.0 ──── 5.0 ──── 10.0 ──── 20.0 ──── 30.0 ──── ∞
//!     LPG      CO     Methane    Smoke     Butane    Alcohol
//! ```
//!
//! ## Calibration curves
//!
//! The datasheet sensitivity curves are straight lines on log-log axes:
//!
//! ```text
//! log10(RS/R0) = m * log10(ppm) + b
//! ppm          = 10 ^ ((log10(RS/R0) - b) / m)
//! ```
//!
//! Slopes are negative: resistance drops as concentration rises.

// ===== RESISTANCE BANDS (kΩ) =====

/// Exclusive upper bound of the LPG band.
pub const LPG_BAND_UPPER_KOHM: f64 = 1.0;

/// Exclusive upper bound of the CO band.
pub const CO_BAND_UPPER_KOHM: f64 = 5.0;

/// Exclusive upper bound of the Methane band.
pub const METHANE_BAND_UPPER_KOHM: f64 = 10.0;

/// Exclusive upper bound of the Smoke band.
pub const SMOKE_BAND_UPPER_KOHM: f64 = 20.0;

/// Exclusive upper bound of the Butane band. Alcohol starts here.
pub const BUTANE_BAND_UPPER_KOHM: f64 = 30.0;

// ===== LOG-LOG CURVE FITS (slope m, intercept b) =====

/// LPG curve slope `m`
pub const LPG_CURVE_SLOPE: f64 = -0.473;
/// LPG curve intercept `b`
pub const LPG_CURVE_INTERCEPT: f64 = 1.413;

/// Methane curve slope `m`
pub const METHANE_CURVE_SLOPE: f64 = -0.510;
/// Methane curve intercept `b`
pub const METHANE_CURVE_INTERCEPT: f64 = 1.402;

/// Smoke curve slope `m`
pub const SMOKE_CURVE_SLOPE: f64 = -0.500;
/// Smoke curve intercept `b`
pub const SMOKE_CURVE_INTERCEPT: f64 = 1.300;

/// CO curve slope `m`
pub const CO_CURVE_SLOPE: f64 = -0.430;
/// CO curve intercept `b`
pub const CO_CURVE_INTERCEPT: f64 = 1.500;

/// Butane curve slope `m`
pub const BUTANE_CURVE_SLOPE: f64 = -0.490;
/// Butane curve intercept `b`
pub const BUTANE_CURVE_INTERCEPT: f64 = 1.450;

/// Alcohol curve slope `m`
pub const ALCOHOL_CURVE_SLOPE: f64 = -0.490;
/// Alcohol curve intercept `b`
pub const ALCOHOL_CURVE_INTERCEPT: f64 = 1.550;

// ===== RULE-BASED HAZARD CUTOFFS (raw ADC counts) =====

/// Raw readings below this are rated low hazard.
pub const HAZARD_LOW_UPPER_RAW: u16 = 150;

/// Raw readings below this (and at or above the low cutoff) are rated moderate.
pub const HAZARD_MODERATE_UPPER_RAW: u16 = 500;
