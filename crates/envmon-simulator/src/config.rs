//! Simulator configuration, loaded from an optional JSON file.

use std::fs;
use std::path::Path;

use envmon_core::Timing;
use serde::Deserialize;
use thiserror::Error;

/// Top-level simulator settings. Every field has a default.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Task periods; the production schedule unless overridden
    pub timing: Timing,
    /// Synthetic sensor behaviour
    pub sensor: MockSensorConfig,
    /// Button presses to inject, in milliseconds after start
    pub presses_ms: Vec<u64>,
    /// Stop after this many seconds; run forever when absent
    pub run_for_secs: Option<u64>,
}

/// Shape of the synthetic temperature/humidity signal.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MockSensorConfig {
    pub base_temperature: f32,
    pub temperature_swing: f32,
    pub base_humidity: f32,
    pub humidity_swing: f32,
    /// Seconds for one full swing
    pub period_secs: f32,
    /// Fail every n-th read, never when absent or zero
    pub fail_every: Option<u32>,
}

impl Default for MockSensorConfig {
    fn default() -> Self {
        // Dips below 24.9 °C and above 27 % once per period
        Self {
            base_temperature: 25.6,
            temperature_swing: 1.2,
            base_humidity: 22.0,
            humidity_swing: 6.0,
            period_secs: 120.0,
            fail_every: Some(7),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("timing.{0} must be greater than zero")]
    ZeroPeriod(&'static str),
}

impl SimulatorConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let text = fs::read_to_string(path)?;
                Self::parse(&text)
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        match config.timing.zero_period() {
            Some(field) => Err(ConfigError::ZeroPeriod(field)),
            None => Ok(config),
        }
    }
}
