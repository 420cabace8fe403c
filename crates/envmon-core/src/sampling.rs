//! Sensor sampling task

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Timer, with_timeout};
use log::{debug, info, warn};

use crate::app_state::SharedState;
use crate::config::Timing;
use crate::sensors::{Reading, Sensor, SensorError};

/// Polls the sensor on a fixed cadence and publishes good readings.
///
/// A failed poll leaves the shared state untouched; the next scheduled poll
/// is the only retry.
pub struct SensorSource<'a, M: RawMutex, S: Sensor> {
    state: &'a SharedState<M>,
    sensor: S,
    timing: Timing,
}

impl<'a, M: RawMutex, S: Sensor> SensorSource<'a, M, S> {
    pub fn new(state: &'a SharedState<M>, sensor: S, timing: Timing) -> Self {
        Self {
            state,
            sensor,
            timing,
        }
    }

    /// Take one reading and publish it.
    ///
    /// The read is bounded by the poll period so a hung driver cannot stall
    /// the task.
    pub async fn sample(&mut self) -> Result<Reading, SensorError> {
        let reading = match with_timeout(self.timing.sensor_poll(), self.sensor.read()).await {
            Ok(result) => result,
            Err(_) => Err(SensorError::Timeout),
        }
        .inspect_err(|e| warn!("Sensor read failed: {}", e))?;

        self.state.publish_reading(reading).await;
        debug!("Published {}", reading);
        Ok(reading)
    }

    pub async fn run(mut self) -> ! {
        info!("Sensor source started");
        loop {
            let _ = self.sample().await;
            Timer::after(self.timing.sensor_poll()).await;
        }
    }
}
