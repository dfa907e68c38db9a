//! Shared fixtures for integration tests
//!
//! - Raw-count scenarios for a developing leak
//! - Tolerance helpers for float assertions

#![allow(dead_code)]

use gasguard_core::RawReading;

/// Raw counts at the first reading of each band, 12 V rail
///
/// Lower counts mean higher resistance: RS = (1023 - raw) / raw.
pub const BAND_ENTRY_RAW: [(u16, &str); 6] = [
    (512, "LPG"),
    (171, "CO"),
    (94, "Methane"),
    (49, "Smoke"),
    (34, "Butane"),
    (30, "Alcohol"),
];

/// Raw counts rising linearly from `start` to `end` over `steps` samples
pub fn leak_ramp(start: u16, end: u16, steps: usize) -> Vec<RawReading> {
    let span = end as f64 - start as f64;
    (0..steps)
        .map(|i| {
            let t = if steps > 1 { i as f64 / (steps - 1) as f64 } else { 0.0 };
            RawReading::saturating((start as f64 + span * t).round() as i64)
        })
        .collect()
}

/// Simple LCG, enough for repeatable noise without a dev-dependency
pub struct Noise {
    seed: u32,
}

impl Noise {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Uniform in [-amplitude, amplitude]
    pub fn next(&mut self, amplitude: f64) -> f64 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        let uniform = self.seed as f64 / u32::MAX as f64;
        (uniform - 0.5) * 2.0 * amplitude
    }
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} +/- {}, got {}",
        expected,
        tolerance,
        actual
    );
}
