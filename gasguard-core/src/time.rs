//! Clocks for stamping monitor samples
//!
//! Readings from the sensor board carry no time of their own, so the monitor
//! asks a [`TimeSource`]. Host builds read the wall clock; tests, replays and
//! firmware supply their own.

use core::cell::Cell;

use crate::constants::time::DEFAULT_SAMPLE_INTERVAL_MS;

/// Milliseconds on whatever scale the clock uses (Unix epoch for
/// [`WallClock`], arbitrary for replays)
pub type Timestamp = u64;

/// Anything that can say what time it is, in milliseconds
pub trait TimeSource {
    /// Current time in milliseconds
    fn now(&self) -> Timestamp;
}

/// Unix time from the operating system
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallClock;

#[cfg(feature = "std")]
impl TimeSource for WallClock {
    fn now(&self) -> Timestamp {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        since_epoch.as_millis() as Timestamp
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    /// Clock reading `now`
    pub const fn at(now: Timestamp) -> Self {
        Self { now }
    }

    /// Jump to `now`
    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Move forward by `ms`
    pub fn tick(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}

/// Clock for captured logs: every reading is one sample interval after the
/// previous one, starting at 0
#[derive(Debug, Clone)]
pub struct SampleClock {
    next: Cell<Timestamp>,
    interval_ms: u64,
}

impl SampleClock {
    /// Clock stepping `interval_ms` per reading
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            next: Cell::new(0),
            interval_ms,
        }
    }

    /// Step between consecutive readings
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

impl Default for SampleClock {
    /// One step per board sample period
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL_MS)
    }
}

impl TimeSource for SampleClock {
    fn now(&self) -> Timestamp {
        let now = self.next.get();
        self.next.set(now.saturating_add(self.interval_ms));
        now
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Change per second, given a change over `elapsed_ms`; 0 when no time passed
pub fn rate_per_second(delta: f64, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    delta * crate::constants::time::MS_PER_SECOND as f64 / elapsed_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_on_request() {
        let mut clock = ManualClock::at(250);
        assert_eq!(clock.now(), 250);

        clock.tick(750);
        assert_eq!(clock.now(), 1_000);

        clock.set(5);
        assert_eq!(clock.now(), 5);

        clock.set(u64::MAX);
        clock.tick(1);
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn sample_clock_steps_once_per_reading() {
        let clock = SampleClock::default();
        assert_eq!(clock.interval_ms(), 1_000);
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.now(), 1_000);
        assert_eq!(clock.now(), 2_000);

        let fast = SampleClock::new(250);
        assert_eq!((&fast).now(), 0);
        assert_eq!(fast.now(), 250);
    }

    #[cfg(feature = "std")]
    #[test]
    fn wall_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(WallClock.now() > 1_577_836_800_000);
    }

    #[test]
    fn per_second_rates() {
        // 30 ppm over 1.5 s
        assert_eq!(rate_per_second(30.0, 1_500), 20.0);
        assert_eq!(rate_per_second(-4.0, 2_000), -2.0);
        assert_eq!(rate_per_second(99.0, 0), 0.0);
    }
}
