//! Synthetic temperature/humidity source for running without hardware.

use core::f32::consts::TAU;

use embassy_time::Instant;
use envmon_core::{Reading, Sensor, SensorError};

use crate::config::MockSensorConfig;

/// Generates slowly varying readings, with optional injected failures.
pub struct MockSensor {
    config: MockSensorConfig,
    started: Instant,
    reads: u32,
}

impl MockSensor {
    pub fn new(config: MockSensorConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            reads: 0,
        }
    }

    /// Signal value `t` seconds after start.
    ///
    /// Temperature and humidity swing in opposite phase so the cold and humid
    /// alarm conditions arrive at different times.
    fn sample_at(&self, t: f32) -> (f32, f32) {
        let period = self.config.period_secs.max(1.0);
        let phase = TAU * t / period;
        let temperature = self.config.base_temperature + self.config.temperature_swing * phase.sin();
        let humidity = self.config.base_humidity + self.config.humidity_swing * (phase + 0.5 * TAU).sin();
        (temperature, humidity)
    }

    fn should_fail(&self) -> bool {
        self.config
            .fail_every
            .is_some_and(|n| n > 0 && self.reads % n == 0)
    }
}

impl Sensor for MockSensor {
    async fn read(&mut self) -> Result<Reading, SensorError> {
        self.reads = self.reads.wrapping_add(1);
        if self.should_fail() {
            return Err(SensorError::ReadFailed {
                sensor: "mock",
                details: "injected failure",
            });
        }

        let t = self.started.elapsed().as_millis() as f32 / 1000.0;
        let (temperature, humidity) = self.sample_at(t);
        Reading::new(temperature, humidity)
    }
}
