//! Concentration from resistance ratio
//!
//! Inverts the datasheet curve `log10(RS/R0) = m * log10(ppm) + b`:
//!
//! ```text
//! ratio = RS / R0
//! log_x = (log10(ratio) - b) / m
//! ppm   = 10 ^ log_x
//! ```
//!
//! The curve is undefined for `ratio <= 0`, which happens at full-scale
//! readings (RS = 0). That is reported as `InvalidRatio`, never as a number.
//! An unbounded resistance gives an infinite ratio and, with the negative MQ
//! slopes, a concentration of 0 ppm.

use crate::errors::{EstimatorError, EstimatorResult};
use crate::profiles::GasProfile;
use crate::resistance::Resistance;
use crate::traits::Validatable;

/// RS / R0 for a finite resistance, unbounded otherwise
pub fn resistance_ratio(resistance: Resistance, baseline_r0_kohm: f64) -> f64 {
    resistance.as_f64() / baseline_r0_kohm
}

/// Concentration (ppm) of `profile.gas`
pub fn estimate_ppm(
    resistance: Resistance,
    baseline_r0_kohm: f64,
    profile: &GasProfile,
) -> EstimatorResult<f64> {
    let ratio = resistance_ratio(resistance, baseline_r0_kohm);

    if ratio.is_nan() || ratio <= 0.0 {
        return Err(EstimatorError::InvalidRatio { ratio });
    }

    let log_x = (libm::log10(ratio) - profile.intercept) / profile.slope;
    let ppm = libm::pow(10.0, log_x);

    // 10^x is never negative; NaN only if the profile itself was degenerate
    if ppm.is_nan() {
        return Err(EstimatorError::InvalidRatio { ratio });
    }
    debug_assert!(ppm >= 0.0);

    Ok(ppm)
}

/// Concentration, keeping only finite results
pub fn estimate_finite_ppm(
    resistance: Resistance,
    baseline_r0_kohm: f64,
    profile: &GasProfile,
) -> Option<f64> {
    estimate_ppm(resistance, baseline_r0_kohm, profile)
        .ok()
        .filter(|ppm| ppm.is_valid())
}
