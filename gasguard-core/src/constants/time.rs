//! Time-Related Constants

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Default interval between microcontroller samples (milliseconds).
///
/// The serial firmware prints one `Gas Level` line per second.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;
