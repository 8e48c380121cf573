//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a built-in default, so an empty file (or no file at all,
//! via [`Config::default`]) yields a working panel for an Arduino on
//! `/dev/ttyACM0` at 9600 baud.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{CentrifugeError, Result};

/// Baud rates accepted for the controller link
const SUPPORTED_BAUD_RATES: &[u32] = &[1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub panel: PanelConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Time to wait after opening the port; opening resets most Arduino boards
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,
}

/// Update cycle and display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            reset_delay_ms: default_reset_delay_ms(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            history_capacity: default_history_capacity(),
        }
    }
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_timeout_ms() -> u64 { 100 }
fn default_reset_delay_ms() -> u64 { 2000 }

fn default_update_interval_ms() -> u64 { 50 }
fn default_history_capacity() -> usize { 500 }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use centrifuge_panel::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {}",
                SUPPORTED_BAUD_RATES
                    .iter()
                    .map(|rate| rate.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.serial.reset_delay_ms > 10000 {
            return Err(invalid("reset_delay_ms must be at most 10000"));
        }

        if self.panel.update_interval_ms == 0 || self.panel.update_interval_ms > 1000 {
            return Err(invalid("update_interval_ms must be between 1 and 1000"));
        }

        if self.panel.history_capacity == 0 || self.panel.history_capacity > 100_000 {
            return Err(invalid("history_capacity must be between 1 and 100000"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> CentrifugeError {
    CentrifugeError::Config(toml::de::Error::custom(msg))
}
