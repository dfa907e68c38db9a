//! Serial-to-sink relay loop
//!
//! [`Relay::run`] pulls lines from a [`SerialSource`], estimates every valid
//! reading, runs it through the [`LeakMonitor`] and hands the report to a
//! [`ReadingSink`]. It returns when the source is exhausted.

use std::io::{self, BufRead, Write};

use gasguard_core::time::{TimeSource, WallClock};
use gasguard_core::{
    BandClassifier, GasClassifier, GasEstimator, LeakMonitor, MonitorReport, RawReading,
};
use gasguard_ml::{HazardModels, ModelSlot};
use thiserror::Error;

use crate::serial::{LineError, SerialSource};
use crate::ConnectorError;

/// Failure that ends a relay run
#[derive(Debug, Error)]
pub enum RelayError {
    /// The sensor link could not be opened or stopped delivering data
    #[error("sensor link failed: {0}")]
    Connection(#[source] io::Error),
}

/// Counters for one relay run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    /// Lines read from the source
    pub lines: u64,
    /// Lines that parsed into a reading
    pub readings: u64,
    /// Lines that did not
    pub skipped: u64,
    /// Reports the sink rejected
    pub sink_errors: u64,
    /// Reports at or above the emergency threshold
    pub emergencies: u64,
}

/// Destination for monitor reports
pub trait ReadingSink {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError>;
}

impl<S: ReadingSink + ?Sized> ReadingSink for &mut S {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        (**self).accept(report)
    }
}

impl<S: ReadingSink + ?Sized> ReadingSink for Box<S> {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        (**self).accept(report)
    }
}

/// Collects reports in memory
impl ReadingSink for Vec<MonitorReport> {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        self.push(*report);
        Ok(())
    }
}

/// Sends every report to each of several sinks
///
/// All sinks see every report even if an earlier one fails; the last
/// failure is returned.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn ReadingSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ReadingSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReadingSink for Fanout {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        let mut result = Ok(());
        for sink in &mut self.sinks {
            if let Err(e) = sink.accept(report) {
                result = Err(e);
            }
        }
        result
    }
}

/// Prints one line per report, plus alert lines
pub struct ConsoleSink<W> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReadingSink for ConsoleSink<W> {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        let estimate = &report.estimate;
        writeln!(
            self.out,
            "Sensor Reading: {}, Gas: {}, RS: {}, PPM: {}",
            estimate.raw, estimate.gas_type, estimate.resistance, estimate.concentration
        )?;

        if report.emergency {
            writeln!(self.out, "  EMERGENCY: {} level reached", report.pattern)?;
        } else if report.ventilation {
            writeln!(self.out, "  ventilation required ({})", report.pattern)?;
        }
        if report.drift_detected {
            writeln!(self.out, "  sensor drift detected, recalibrate")?;
        }
        Ok(())
    }
}

/// Runs the hazard models on each reading and prints their labels
///
/// Pair with a [`ConsoleSink`] in a [`Fanout`] to get the reading line too.
pub struct ModelSink<W> {
    models: HazardModels,
    out: W,
}

impl ModelSink<io::Stdout> {
    pub fn stdout(models: HazardModels) -> Self {
        Self::new(models, io::stdout())
    }
}

impl<W: Write> ModelSink<W> {
    pub fn new(models: HazardModels, out: W) -> Self {
        Self { models, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReadingSink for ModelSink<W> {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        let raw = report.estimate.raw;
        let prediction = self
            .models
            .predict_reading(raw)
            .map_err(|e| ConnectorError::Sink(e.to_string()))?;

        for slot in ModelSlot::ALL {
            writeln!(self.out, "  {} Prediction: {}", slot, prediction.label(slot))?;
        }
        Ok(())
    }
}

/// Estimator plus leak monitor for one sensor link
pub struct Relay<C = BandClassifier, T = WallClock> {
    estimator: GasEstimator<C>,
    monitor: LeakMonitor,
    clock: T,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(GasEstimator::default(), WallClock)
    }
}

impl<C: GasClassifier, T: TimeSource> Relay<C, T> {
    pub fn new(estimator: GasEstimator<C>, clock: T) -> Self {
        Self {
            estimator,
            monitor: LeakMonitor::new(),
            clock,
        }
    }

    pub fn estimator(&self) -> &GasEstimator<C> {
        &self.estimator
    }

    pub fn monitor(&self) -> &LeakMonitor {
        &self.monitor
    }

    /// Estimate and monitor one reading
    pub fn process(&mut self, raw: RawReading) -> MonitorReport {
        let estimate = self.estimator.estimate(raw);
        self.monitor.observe_now(estimate, &self.clock)
    }

    /// Relay until the source is exhausted
    pub fn run<R, S>(
        &mut self,
        source: &mut SerialSource<R>,
        sink: &mut S,
    ) -> Result<RelayStats, RelayError>
    where
        R: BufRead,
        S: ReadingSink + ?Sized,
    {
        let mut stats = RelayStats::default();

        loop {
            let line = match source.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    log::error!("{} after {} lines", e, stats.lines);
                    return Err(e);
                }
            };
            stats.lines += 1;

            let raw = match line {
                Ok(raw) => raw,
                Err(e) => {
                    match e {
                        LineError::NotAReading(_) => log::debug!("skipping line {}: {}", stats.lines, e),
                        _ => log::warn!("dropping line {}: {}", stats.lines, e),
                    }
                    stats.skipped += 1;
                    continue;
                }
            };
            stats.readings += 1;

            let report = self.process(raw);
            if report.emergency {
                stats.emergencies += 1;
            }

            if let Err(e) = sink.accept(&report) {
                log::warn!("sink rejected reading {}: {}", raw, e);
                stats.sink_errors += 1;
            }
        }

        log::info!(
            "relay finished: {} readings, {} skipped, {} sink errors",
            stats.readings,
            stats.skipped,
            stats.sink_errors
        );
        Ok(stats)
    }
}
