//! Core estimator for GasGuard
//!
//! Turns a raw 10-bit reading from an MQ-series gas sensor into a gas
//! identification and a concentration estimate.
//! Designed for edge devices with limited resources.
//!
//! Key constraints:
//! - Runs without a heap (fixed-capacity catalogs and history)
//! - Every reading yields a result; failures become sentinels
//! - Configuration is injected and immutable after construction
//!
//! ```
//! use gasguard_core::{GasEstimator, GasType, RawReading};
//!
//! let estimator = GasEstimator::default();
//! let estimate = estimator.estimate(RawReading::new(500).unwrap());
//!
//! assert_eq!(estimate.gas_type, GasType::Co);
//! assert!(estimate.concentration.is_valid());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Logging compiles away when the `log` feature is off; arguments are still
// evaluated by reference so call sites don't trip unused-variable lints.
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

pub mod classifier;
pub mod concentration;
pub mod config;
pub mod constants;
pub mod errors;
pub mod estimator;
pub mod gas;
pub mod hazard;
pub mod monitor;
pub mod profiles;
pub mod reading;
pub mod resistance;
pub mod time;
pub mod traits;
pub mod window;

// Public API
pub use classifier::{BandClassifier, ResistanceBand};
pub use config::EstimatorConfig;
pub use errors::{EstimatorError, EstimatorResult};
pub use estimator::{Concentration, Estimate, GasEstimator};
pub use gas::GasType;
pub use hazard::{HazardAssessment, HazardDimension, HazardLevel};
pub use monitor::{LeakMonitor, MonitorReport, ResponsePattern};
pub use profiles::{GasProfile, ProfileCatalog};
pub use reading::RawReading;
pub use resistance::{Resistance, ResistanceConverter};
pub use traits::GasClassifier;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
