//! Sensor readings and the driver-facing sensor trait

use core::fmt;
use core::future::Future;

use thiserror_no_std::Error;

use crate::config::{ALARM_HUMIDITY_ABOVE_PCT, ALARM_TEMPERATURE_BELOW_C};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} read failed: {details}")]
    ReadFailed {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("sensor returned invalid data")]
    InvalidData,
    #[error("sensor did not answer in time")]
    Timeout,
}

/// One temperature/humidity sample.
///
/// Only constructed from finite values; a driver that produced NaN (the
/// usual DHT "no reading") gets [`SensorError::InvalidData`] instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    temperature: f32,
    humidity: f32,
}

impl Reading {
    /// Build a reading from degrees Celsius and percent relative humidity.
    pub fn new(temperature: f32, humidity: f32) -> Result<Self, SensorError> {
        if temperature.is_finite() && humidity.is_finite() {
            Ok(Self {
                temperature,
                humidity,
            })
        } else {
            Err(SensorError::InvalidData)
        }
    }

    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    pub const fn humidity(&self) -> f32 {
        self.humidity
    }

    /// Raw threshold check: too cold or too humid.
    ///
    /// Both bounds are strict, a reading of exactly 24.9 °C / 27.0 % is fine.
    pub fn breaches_limits(&self) -> bool {
        self.temperature < ALARM_TEMPERATURE_BELOW_C || self.humidity > ALARM_HUMIDITY_ABOVE_PCT
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} C / {:.2} %", self.temperature, self.humidity)
    }
}

/// Trait for temperature/humidity sensor drivers.
pub trait Sensor {
    /// Take one measurement.
    fn read(&mut self) -> impl Future<Output = Result<Reading, SensorError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_nan() {
        assert_eq!(Reading::new(f32::NAN, 40.0), Err(SensorError::InvalidData));
        assert_eq!(Reading::new(22.0, f32::NAN), Err(SensorError::InvalidData));
        assert_eq!(
            Reading::new(f32::INFINITY, 40.0),
            Err(SensorError::InvalidData)
        );
    }

    #[test]
    fn test_cold_reading_breaches() {
        let reading = Reading::new(24.5, 20.0).unwrap();
        assert!(reading.breaches_limits());
    }

    #[test]
    fn test_humid_reading_breaches() {
        let reading = Reading::new(25.5, 30.0).unwrap();
        assert!(reading.breaches_limits());
    }

    #[test]
    fn test_comfortable_reading_within_limits() {
        let reading = Reading::new(25.5, 20.0).unwrap();
        assert!(!reading.breaches_limits());
    }

    #[test]
    fn test_bounds_are_strict() {
        assert!(!Reading::new(24.9, 27.0).unwrap().breaches_limits());
        assert!(Reading::new(24.89, 27.0).unwrap().breaches_limits());
        assert!(Reading::new(24.9, 27.01).unwrap().breaches_limits());
    }
}
