//! Line protocol from the sensor board
//!
//! The board prints `Gas Level: <raw>` once per sample. Anything else on the
//! link (boot banners, blank lines, partial writes after a reset) is not a
//! reading and is reported as a [`LineError`] for the caller to skip.
//!
//! The device node is read as an ordinary file; line settings such as the
//! baud rate are applied to the port outside this process (`stty`, udev rule
//! or the board's defaults). [`SerialConfig::baud_rate`] records the rate
//! the board is expected to use.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use gasguard_core::RawReading;
use thiserror::Error;

use crate::relay::RelayError;

/// Prefix of every reading line
pub const READING_PREFIX: &str = "Gas Level";

/// Baud rate of the stock board firmware
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Why one line was not a reading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("line is not valid UTF-8")]
    NotUtf8,

    #[error("not a reading: {0:?}")]
    NotAReading(String),

    #[error("bad integer in reading: {0:?}")]
    BadInteger(String),

    #[error("reading {0} outside the ADC range")]
    OutOfRange(i64),
}

/// Parse one line of board output into a reading
///
/// Trailing `\r\n` and surrounding whitespace are ignored.
pub fn parse_line(line: &[u8]) -> Result<RawReading, LineError> {
    let text = std::str::from_utf8(line).map_err(|_| LineError::NotUtf8)?;
    let text = text.trim();

    let rest = text
        .strip_prefix(READING_PREFIX)
        .ok_or_else(|| LineError::NotAReading(text.to_string()))?;

    let value = rest
        .split(':')
        .nth(1)
        .ok_or_else(|| LineError::BadInteger(rest.to_string()))?
        .trim();

    let raw: i64 = value
        .parse()
        .map_err(|_| LineError::BadInteger(value.to_string()))?;

    u32::try_from(raw)
        .ok()
        .and_then(|raw| RawReading::new(raw).ok())
        .ok_or(LineError::OutOfRange(raw))
}

/// Where and how to open the sensor link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device node, e.g. `/dev/ttyUSB0`
    pub port: PathBuf,
    pub baud_rate: u32,
}

impl SerialConfig {
    pub fn new(port: impl Into<PathBuf>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }

    /// Set the expected baud rate
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn open(&self) -> Result<SerialSource<BufReader<File>>, RelayError> {
        log::info!(
            "opening {} (board at {} baud)",
            self.port.display(),
            self.baud_rate
        );
        SerialSource::open(&self.port)
    }
}

/// Line reader over the sensor link
#[derive(Debug)]
pub struct SerialSource<R> {
    reader: R,
    buf: Vec<u8>,
    lines: u64,
}

impl SerialSource<BufReader<File>> {
    /// Open a device node or capture file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let file = File::open(path.as_ref()).map_err(RelayError::Connection)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SerialSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(64),
            lines: 0,
        }
    }

    /// Next line from the link
    ///
    /// `Ok(None)` once the source is exhausted. The inner result is the
    /// per-line outcome; the outer error means the link itself failed.
    pub fn next_line(&mut self) -> Result<Option<Result<RawReading, LineError>>, RelayError> {
        self.buf.clear();
        loop {
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(RelayError::Connection(e)),
            }
        }

        self.lines += 1;
        Ok(Some(parse_line(&self.buf)))
    }

    /// Lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_output() {
        assert_eq!(parse_line(b"Gas Level: 512\r\n").unwrap().value(), 512);
        assert_eq!(parse_line(b"Gas Level:0").unwrap().value(), 0);
        assert_eq!(parse_line(b"  Gas Level :  1023 ").unwrap().value(), 1023);
    }

    #[test]
    fn classifies_bad_lines() {
        assert_eq!(
            parse_line(b"MQ-2 warming up"),
            Err(LineError::NotAReading("MQ-2 warming up".into()))
        );
        assert_eq!(parse_line(b"\n"), Err(LineError::NotAReading(String::new())));
        assert_eq!(parse_line(&[0xff, 0xfe, b'\n']), Err(LineError::NotUtf8));
        assert_eq!(
            parse_line(b"Gas Level: 5x"),
            Err(LineError::BadInteger("5x".into()))
        );
        assert_eq!(
            parse_line(b"Gas Level 12"),
            Err(LineError::BadInteger(" 12".into()))
        );
        assert_eq!(parse_line(b"Gas Level: 1024"), Err(LineError::OutOfRange(1024)));
        assert_eq!(parse_line(b"Gas Level: -3"), Err(LineError::OutOfRange(-3)));
    }

    #[test]
    fn source_yields_every_line() {
        let mut source = SerialSource::new(&b"Gas Level: 10\nnoise\nGas Level: 20"[..]);

        assert_eq!(source.next_line().unwrap().unwrap().unwrap().value(), 10);
        assert!(source.next_line().unwrap().unwrap().is_err());
        // last line has no terminator
        assert_eq!(source.next_line().unwrap().unwrap().unwrap().value(), 20);
        assert!(source.next_line().unwrap().is_none());
        assert_eq!(source.lines_read(), 3);
    }

    #[test]
    fn missing_device_is_a_connection_error() {
        let err = SerialSource::open("/nonexistent/ttyGAS0").unwrap_err();
        assert!(matches!(err, RelayError::Connection(_)));
    }

    #[test]
    fn config_builder() {
        let config = SerialConfig::new("/dev/ttyUSB0").baud_rate(115_200);
        assert_eq!(config.port, PathBuf::from("/dev/ttyUSB0"));
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(SerialConfig::new("COM3").baud_rate, DEFAULT_BAUD_RATE);
    }
}
