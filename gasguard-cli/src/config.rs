//! `gasguard.toml` loading
//!
//! Every table and key is optional:
//!
//! ```toml
//! [estimator]
//! supply_voltage_v = 5.0
//! baseline_r0_kohm = 0.4388
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//!
//! [http]
//! url = "http://localhost:5000"
//! timeout_secs = 10
//!
//! [server]
//! addr = "127.0.0.1:5000"
//! ```
//!
//! Command-line flags override whatever the file sets.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gasguard_connectors::serial::DEFAULT_BAUD_RATE;
use gasguard_connectors::{HttpConfig, SerialConfig};
use gasguard_core::EstimatorConfig;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub estimator: EstimatorConfig,
    pub serial: SerialSection,
    pub http: HttpSection,
    pub server: ServerSection,
    pub models: ModelsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialSection {
    pub port: Option<PathBuf>,
    pub baud_rate: u32,
}

impl Default for SerialSection {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub bearer_token: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub addr: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

/// Where trained hazard models are kept
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelsSection {
    pub path: PathBuf,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hazard_models.json"),
        }
    }
}

impl Config {
    /// Parse a config from TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("failed to parse config")?;
        config.estimator.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Serial settings with an optional port override
    pub fn serial_config(&self, port: Option<PathBuf>) -> Result<SerialConfig> {
        let port = port
            .or_else(|| self.serial.port.clone())
            .context("no serial port given (use --port or [serial] port)")?;
        Ok(SerialConfig::new(port).baud_rate(self.serial.baud_rate))
    }

    /// HTTP client settings with an optional URL override
    pub fn http_config(&self, url: Option<String>) -> HttpConfig {
        let mut config = HttpConfig::new(url.unwrap_or_else(|| self.http.url.clone()))
            .timeout_secs(self.http.timeout_secs)
            .max_retries(self.http.max_retries);
        if let Some(token) = &self.http.bearer_token {
            config = config.bearer_token(token.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasguard_connectors::AuthMethod;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_tables() {
        let config = Config::from_toml(
            r#"
            [estimator]
            supply_voltage_v = 5.0

            [serial]
            port = "/dev/ttyACM0"

            [http]
            bearer_token = "t0k"
            "#,
        )
        .unwrap();

        assert_eq!(config.estimator.supply_voltage_v, 5.0);
        assert_eq!(
            config.estimator.baseline_r0_kohm,
            EstimatorConfig::default().baseline_r0_kohm
        );
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);

        let serial = config.serial_config(None).unwrap();
        assert_eq!(serial.port, PathBuf::from("/dev/ttyACM0"));

        let http = config.http_config(None);
        assert_eq!(http.base_url, "http://localhost:5000");
        assert_eq!(http.auth, AuthMethod::Bearer("t0k".into()));
    }

    #[test]
    fn flags_override_file() {
        let config = Config::from_toml("[serial]\nport = \"/dev/ttyUSB0\"").unwrap();
        let serial = config.serial_config(Some(PathBuf::from("capture.log"))).unwrap();
        assert_eq!(serial.port, PathBuf::from("capture.log"));
        assert_eq!(
            config.http_config(Some("http://10.0.0.2:8080".into())).base_url,
            "http://10.0.0.2:8080"
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_toml("[estimator]\nbaseline_r0_kohm = 0.0").is_err());
        assert!(Config::from_toml("[serial]\nspeed = 9600").is_err());
        assert!(Config::from_toml("[server]\naddr = \"localhost\"").is_err());
        assert!(Config::default().serial_config(None).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gasguard.toml");
        std::fs::write(&path, "[server]\naddr = \"0.0.0.0:8000\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.addr.port(), 8000);
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
