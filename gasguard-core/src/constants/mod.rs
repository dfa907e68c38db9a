//! Constants for GasGuard Core
//!
//! Every numeric value the estimator depends on lives here, with its unit in
//! the name and its source in the doc comment.
//!
//! ## Organization
//!
//! - **Circuit**: ADC resolution and the default divider/calibration values
//! - **Sensors**: MQ-2 resistance bands and log-log curve fits per gas
//! - **Safety**: explosive limits and alarm thresholds
//! - **Time**: unit conversions
//! - **Buffers**: fixed capacities for history and catalogs

/// ADC resolution and default circuit constants.
pub mod circuit;

/// MQ-2 resistance bands and calibration curves.
pub mod sensors;

/// Explosive limits, ventilation and drift thresholds.
pub mod safety;

/// Time unit conversions.
pub mod time;

/// Fixed capacities for embedded-friendly containers.
pub mod buffers;

pub use circuit::{
    ADC_MAX, DEFAULT_SUPPLY_VOLTAGE_V, DEFAULT_LOAD_RESISTANCE_KOHM,
    DEFAULT_BASELINE_R0_KOHM, UNBOUNDED_DISPLAY_KOHM,
};

pub use sensors::{
    LPG_BAND_UPPER_KOHM, CO_BAND_UPPER_KOHM, METHANE_BAND_UPPER_KOHM,
    SMOKE_BAND_UPPER_KOHM, BUTANE_BAND_UPPER_KOHM,
};

pub use safety::{
    LPG_LOWER_EXPLOSIVE_LIMIT_PPM, EMERGENCY_LEL_FRACTION,
    VENTILATION_THRESHOLD_PPM, DRIFT_THRESHOLD_PPM,
};

pub use time::{DEFAULT_SAMPLE_INTERVAL_MS, MS_PER_SECOND};

pub use buffers::{MAX_GAS_PROFILES, MAX_BANDS, RATE_WINDOW_SIZE, DRIFT_WINDOW_SIZE};
