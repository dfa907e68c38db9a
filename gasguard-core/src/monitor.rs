//! Leak monitoring over a stream of estimates
//!
//! A `LeakMonitor` keeps two short histories of valid concentrations and
//! turns each new estimate into a `MonitorReport`:
//!
//! - rise rate across the last `RATE_WINDOW_SIZE` samples (ppm/s)
//! - drift flag once `DRIFT_WINDOW_SIZE` samples are held
//! - ventilation / emergency flags from the safety thresholds
//! - a coarse response pattern guessing the source of the leak
//!
//! Estimates without a concentration are reported but never enter history.

use core::fmt;

use crate::constants::buffers::{DRIFT_WINDOW_SIZE, RATE_WINDOW_SIZE};
use crate::constants::safety::{
    DRIFT_THRESHOLD_PPM, LPG_PATTERN_MIN_RATE_PPM_PER_S, PATTERN_SPLIT_PPM,
    SMOKE_PATTERN_MIN_RATE_PPM_PER_S,
};
use crate::estimator::Estimate;
use crate::hazard::{self, HazardAssessment};
use crate::time::{self, TimeSource, Timestamp};
use crate::window::{Sample, SampleWindow};

/// Likely leak source, from how fast and how high concentration rises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResponsePattern {
    /// Fast rise to a high level
    #[cfg_attr(feature = "serde", serde(rename = "LPG/Propane"))]
    LpgPropane,
    /// Fast rise that stays low
    #[cfg_attr(feature = "serde", serde(rename = "Smoke/CO"))]
    SmokeCo,
    /// Anything else
    #[cfg_attr(feature = "serde", serde(rename = "Unknown combustible"))]
    UnknownCombustible,
}

impl ResponsePattern {
    /// Classify from rise rate (ppm/s) and current concentration (ppm)
    pub fn classify(rate_ppm_per_s: f64, ppm: f64) -> Self {
        if rate_ppm_per_s > LPG_PATTERN_MIN_RATE_PPM_PER_S && ppm > PATTERN_SPLIT_PPM {
            Self::LpgPropane
        } else if rate_ppm_per_s > SMOKE_PATTERN_MIN_RATE_PPM_PER_S && ppm < PATTERN_SPLIT_PPM {
            Self::SmokeCo
        } else {
            Self::UnknownCombustible
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::LpgPropane => "LPG/Propane",
            Self::SmokeCo => "Smoke/CO",
            Self::UnknownCombustible => "Unknown combustible",
        }
    }
}

impl fmt::Display for ResponsePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Monitor output for one estimate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonitorReport {
    /// The estimate this report is for
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub estimate: Estimate,
    /// When the estimate was observed (ms)
    pub timestamp: Timestamp,
    /// Rise rate across the rate window
    pub rate_ppm_per_s: f64,
    /// Baseline drift; recalibration recommended
    pub drift_detected: bool,
    /// Concentration calls for forced ventilation
    pub ventilation: bool,
    /// Concentration above the emergency fraction of the LEL
    pub emergency: bool,
    /// Likely leak source
    pub pattern: ResponsePattern,
    /// Rule-based hazard levels for the raw reading
    pub hazard: HazardAssessment,
}

/// Sliding-window leak monitor
///
/// One monitor per sensor. Holds no heap memory.
#[derive(Clone, Default)]
pub struct LeakMonitor {
    rate_window: SampleWindow<RATE_WINDOW_SIZE>,
    drift_window: SampleWindow<DRIFT_WINDOW_SIZE>,
}

impl LeakMonitor {
    /// Monitor with empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an estimate taken at `timestamp` (ms)
    pub fn observe(&mut self, estimate: Estimate, timestamp: Timestamp) -> MonitorReport {
        let hazard = HazardAssessment::from_raw(estimate.raw);

        let ppm = match estimate.concentration.ppm() {
            Some(ppm) => ppm,
            None => {
                return MonitorReport {
                    estimate,
                    timestamp,
                    rate_ppm_per_s: self.rate(),
                    drift_detected: self.drift_detected(),
                    ventilation: false,
                    emergency: false,
                    pattern: ResponsePattern::UnknownCombustible,
                    hazard,
                };
            }
        };

        let sample = Sample { ppm, at: timestamp };
        self.rate_window.push(sample);
        self.drift_window.push(sample);

        let rate = self.rate();
        let drift_detected = self.drift_detected();

        if drift_detected {
            log_warn!("sensor drift detected, recalibration recommended");
        }

        MonitorReport {
            estimate,
            timestamp,
            rate_ppm_per_s: rate,
            drift_detected,
            ventilation: hazard::needs_ventilation(ppm),
            emergency: hazard::is_emergency(ppm),
            pattern: ResponsePattern::classify(rate, ppm),
            hazard,
        }
    }

    /// Record an estimate stamped by `clock`
    pub fn observe_now<T: TimeSource>(&mut self, estimate: Estimate, clock: &T) -> MonitorReport {
        self.observe(estimate, clock.now())
    }

    /// Rise rate between oldest and newest sample in the rate window (ppm/s)
    pub fn rate(&self) -> f64 {
        match (self.rate_window.oldest(), self.rate_window.newest()) {
            (Some(oldest), Some(newest)) if self.rate_window.len() > 1 => time::rate_per_second(
                newest.ppm - oldest.ppm,
                newest.at.saturating_sub(oldest.at),
            ),
            _ => 0.0,
        }
    }

    /// Window mean has wandered from its oldest sample
    pub fn drift_detected(&self) -> bool {
        if !self.drift_window.is_full() {
            return false;
        }

        match (self.drift_window.mean_ppm(), self.drift_window.oldest()) {
            (Some(mean), Some(oldest)) => libm::fabs(mean - oldest.ppm) > DRIFT_THRESHOLD_PPM,
            _ => false,
        }
    }

    /// Valid samples held for drift detection
    pub fn history_len(&self) -> usize {
        self.drift_window.len()
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.rate_window.clear();
        self.drift_window.clear();
    }
}
