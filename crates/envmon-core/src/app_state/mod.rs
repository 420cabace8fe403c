//! Application-wide shared state and error types for envmon

mod shared_state;

pub use shared_state::*;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use thiserror_no_std::Error;

use crate::alarm::{AckLatch, AlarmController};
use crate::blink::BlinkTimer;
use crate::config::{DISPLAY_QUEUE_CAPACITY, Timing};
use crate::display_manager::{DisplayDriver, DisplayRenderer, DisplayedReading};
use crate::evaluator::Evaluator;
use crate::outputs::{Outputs, SharedOutputs};
use crate::sampling::SensorSource;
use crate::sensors::{Reading, Sensor, SensorError};
use crate::status::{DiagnosticSink, StatusReporter};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("Display queue full, reading dropped")]
    QueueFull,
    #[error("Display rejected the frame")]
    Display,
}

/// Every cross-task primitive of the monitor.
///
/// Create one (usually in a `StaticCell`) and build each task from it; the
/// tasks borrow the pieces they need instead of reaching for globals.
///
/// ```rust,ignore
/// static MONITOR: StaticCell<Monitor<CriticalSectionRawMutex>> = StaticCell::new();
///
/// let monitor = MONITOR.init(Monitor::new(Timing::default()));
/// spawner.spawn(sensor_task(monitor.sensor_source(dht)).unwrap());
/// spawner.spawn(evaluator_task(monitor.evaluator()).unwrap());
/// ```
pub struct Monitor<M: RawMutex> {
    state: SharedState<M>,
    display_queue: Channel<M, Reading, DISPLAY_QUEUE_CAPACITY>,
    ack: AckLatch<M>,
    displayed: DisplayedReading<M>,
    timing: Timing,
}

impl<M: RawMutex> Monitor<M> {
    pub const fn new(timing: Timing) -> Self {
        Self {
            state: SharedState::new(),
            display_queue: Channel::new(),
            ack: AckLatch::new(),
            displayed: DisplayedReading::new(),
            timing,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn state(&self) -> &SharedState<M> {
        &self.state
    }

    /// Where the button interrupt reports edges.
    pub fn ack_latch(&self) -> &AckLatch<M> {
        &self.ack
    }

    pub fn displayed(&self) -> &DisplayedReading<M> {
        &self.displayed
    }

    /// Readings waiting for the display renderer.
    pub fn queued_readings(&self) -> usize {
        self.display_queue.len()
    }

    pub fn display_sender(&self) -> Sender<'_, M, Reading, DISPLAY_QUEUE_CAPACITY> {
        self.display_queue.sender()
    }

    pub fn display_receiver(&self) -> Receiver<'_, M, Reading, DISPLAY_QUEUE_CAPACITY> {
        self.display_queue.receiver()
    }

    pub fn sensor_source<S: Sensor>(&self, sensor: S) -> SensorSource<'_, M, S> {
        SensorSource::new(&self.state, sensor, self.timing)
    }

    pub fn evaluator(&self) -> Evaluator<'_, M> {
        Evaluator::new(&self.state, self.display_sender(), self.timing)
    }

    pub fn display_renderer<D: DisplayDriver>(&self, display: D) -> DisplayRenderer<'_, M, D> {
        DisplayRenderer::new(&self.state, self.display_receiver(), &self.displayed, display)
    }

    pub fn alarm_controller<'a, O: Outputs>(
        &'a self,
        outputs: &'a SharedOutputs<M, O>,
    ) -> AlarmController<'a, M, O> {
        AlarmController::new(&self.state, &self.ack, outputs, self.timing)
    }

    pub fn blink_timer<'a, O: Outputs>(
        &'a self,
        outputs: &'a SharedOutputs<M, O>,
    ) -> BlinkTimer<'a, M, O> {
        BlinkTimer::new(&self.state, outputs, self.timing)
    }

    pub fn status_reporter<S: DiagnosticSink>(&self, sink: S) -> StatusReporter<'_, M, S> {
        StatusReporter::new(&self.state, &self.displayed, sink, self.timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[test]
    fn test_sensor_error_converts() {
        let err: MonitorError = SensorError::Timeout.into();
        assert_eq!(err, MonitorError::Sensor(SensorError::Timeout));
    }

    #[test]
    fn test_new_monitor_is_idle() {
        let monitor = Monitor::<CriticalSectionRawMutex>::new(Timing::default());
        assert_eq!(monitor.queued_readings(), 0);
        assert!(!monitor.ack_latch().is_pending());
        assert_eq!(monitor.displayed().get(), None);
        assert_eq!(monitor.timing(), Timing::DEFAULT);
    }
}
