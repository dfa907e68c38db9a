//! Data paths between the sensor, the estimator and the network
//!
//! ## Overview
//!
//! The microcontroller prints one line per ADC sample over its serial link:
//!
//! ```text
//! Gas Level: 512
//! ```
//!
//! This crate turns that stream into estimates and moves them on:
//!
//! ```text
//! serial device ─► SerialSource ─► Relay ─► GasEstimator ─► LeakMonitor ─► ReadingSink
//!                                                                             │
//!                                       ┌─────────────────┬───────────────────┤
//!                                       ▼                 ▼                   ▼
//!                                  ConsoleSink       HttpConnector        ModelSink
//!                                                    POST /gas_data
//! ```
//!
//! and, with the `server` feature, receives the same `/gas_data` posts on the
//! other end.
//!
//! ## Error boundary
//!
//! A line that cannot be parsed is a [`serial::LineError`]: it is logged and
//! skipped, and the relay keeps reading. Losing the device is a
//! [`relay::RelayError`] and ends the loop. Sink failures are counted in
//! [`relay::RelayStats`] but do not stop the relay either.
//!
//! ## Example Usage
//!
//! ```rust
//! use gasguard_connectors::relay::{Relay, ReadingSink};
//! use gasguard_connectors::serial::SerialSource;
//! use gasguard_core::MonitorReport;
//!
//! let input = "boot\nGas Level: 500\nGas Level: 120\n";
//! let mut source = SerialSource::new(input.as_bytes());
//! let mut reports: Vec<MonitorReport> = Vec::new();
//!
//! let stats = Relay::default().run(&mut source, &mut reports)?;
//! assert_eq!(stats.readings, 2);
//! assert_eq!(stats.skipped, 1);
//! assert_eq!(reports.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod relay;
pub mod serial;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "http")]
pub use http::{AuthMethod, HttpConfig, HttpConnector, HttpError};
pub use relay::{ConsoleSink, Fanout, ModelSink, ReadingSink, Relay, RelayError, RelayStats};
pub use serial::{parse_line, LineError, SerialConfig, SerialSource};

use thiserror::Error;

/// Failures delivering a reading downstream
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("downstream is not reachable")]
    NotConnected,

    /// The remote end refused or mangled the exchange
    #[error("delivery failed: {0}")]
    ProtocolError(String),

    #[error("bad connector settings: {0}")]
    ConfigError(String),

    /// A local sink (console, model printer) could not write
    #[error("sink failed: {0}")]
    Sink(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A remote endpoint that accepts serialized payloads
pub trait Connector {
    type Error;

    /// Deliver `data` to `path` on the remote end
    fn send(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error>;

    fn is_connected(&self) -> bool;

    /// Snapshot of delivery counters
    fn stats(&self) -> ConnectionStats;
}

/// Delivery counters kept by every [`Connector`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    pub messages_sent: u64,
    /// Messages abandoned after the last retry
    pub messages_failed: u64,
    /// Payload bytes of delivered messages
    pub bytes_sent: u64,
    /// Attempts beyond the first, across all messages
    pub retries: u32,
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub(crate) fn record_success(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub(crate) fn record_failure(&mut self, error: impl ToString) {
        self.messages_failed += 1;
        self.last_error = Some(error.to_string());
    }
}

/// Crate version, reported by `/health`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_outcomes() {
        let mut stats = ConnectionStats::default();
        stats.record_success(42);
        stats.record_success(8);
        stats.record_failure("Server error 404: not found");

        assert_eq!(stats.messages_sent, 2);
        assert_eq!(stats.bytes_sent, 50);
        assert_eq!(stats.messages_failed, 1);
        assert_eq!(stats.last_error.as_deref(), Some("Server error 404: not found"));
    }

    #[test]
    fn io_errors_convert() {
        let err: ConnectorError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, ConnectorError::Io(_)));
    }
}
