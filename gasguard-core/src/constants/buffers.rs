//! Fixed Capacities
//!
//! Containers in the core are sized at compile time so the estimator and
//! monitor run without a heap.

/// Capacity of a `ProfileCatalog`.
///
/// Six MQ-2 gases plus room for site-specific curves.
pub const MAX_GAS_PROFILES: usize = 8;

/// Capacity of a `BandClassifier` band table.
pub const MAX_BANDS: usize = 8;

/// Samples used for the rate-of-increase estimate.
pub const RATE_WINDOW_SIZE: usize = 3;

/// Samples used for sensor drift detection.
pub const DRIFT_WINDOW_SIZE: usize = 10;
