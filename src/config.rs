// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERIAL: &str = "GECKUSB0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: String,
    pub read_timeout_ms: u32,
    pub write_timeout_ms: u32,
    pub latency_ms: u8,
    pub transfer_size: u32,
    /// Pause after the buffers are flushed on connect.
    pub firmware_settle_ms: u64,
    /// Pause before every status query.
    pub status_settle_ms: u64,
    pub retry_delay_ms: u64,
    pub mem2_upper: Option<u32>,
    pub address_debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: DEFAULT_SERIAL.to_string(),
            read_timeout_ms: 2000,
            write_timeout_ms: 2000,
            latency_ms: 2,
            transfer_size: 0x10000,
            firmware_settle_ms: 150,
            status_settle_ms: 100,
            retry_delay_ms: 100,
            mem2_upper: None,
            address_debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// No settle delays. Meant for the simulator.
    pub fn immediate() -> Self {
        Self {
            firmware_settle_ms: 0,
            status_settle_ms: 0,
            retry_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn with_serial(mut self, serial: &str) -> Self {
        self.serial = serial.to_string();
        self
    }

    pub fn with_timeouts(mut self, read_ms: u32, write_ms: u32) -> Self {
        self.read_timeout_ms = read_ms;
        self.write_timeout_ms = write_ms;
        self
    }

    pub fn with_mem2_upper(mut self, upper: u32) -> Self {
        self.mem2_upper = Some(upper);
        self
    }

    pub fn with_address_debug(mut self, debug: bool) -> Self {
        self.address_debug = debug;
        self
    }

    pub fn firmware_settle(&self) -> Duration {
        Duration::from_millis(self.firmware_settle_ms)
    }

    pub fn status_settle(&self) -> Duration {
        Duration::from_millis(self.status_settle_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.is_empty() {
            return Err(ConfigError::Validation("serial must not be empty".to_string()));
        }
        if self.read_timeout_ms == 0 || self.write_timeout_ms == 0 {
            return Err(ConfigError::Validation("timeouts must be > 0".to_string()));
        }
        if self.transfer_size < 64 {
            return Err(ConfigError::Validation("transfer_size must be at least 64".to_string()));
        }
        if let Some(upper) = self.mem2_upper {
            if !(0x9000_0000..=0xA000_0000).contains(&upper) {
                return Err(ConfigError::Validation(format!(
                    "mem2_upper 0x{:08X} outside 0x90000000..=0xA0000000",
                    upper
                )));
            }
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial, "GECKUSB0");
        assert_eq!(config.read_timeout_ms, 2000);
        assert_eq!(config.latency_ms, 2);
        assert_eq!(config.transfer_size, 0x10000);
        assert_eq!(config.firmware_settle(), Duration::from_millis(150));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::new().with_serial("").validate().is_err());
        assert!(Config::new().with_timeouts(0, 10).validate().is_err());
        assert!(Config::new().with_mem2_upper(0x8000_0000).validate().is_err());
        assert!(Config::new().with_mem2_upper(0x9400_0000).validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gecko.json");
        let config = Config::new().with_mem2_upper(0x9400_0000).with_address_debug(true);
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gecko.json");
        fs::write(&path, r#"{ "latency_ms": 16 }"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.latency_ms, 16);
        assert_eq!(config.serial, DEFAULT_SERIAL);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default("/definitely/not/here.json");
        assert_eq!(config, Config::default());
    }
}
