//! Threshold evaluation task
//!
//! Every evaluation period the evaluator snapshots the latest reading, raises
//! the alarm when the reading breaches the limits (unless the post-ack
//! cool-down is running) and forwards the reading to the display queue.
//! Display freshness is best effort: a full queue drops the reading after a
//! short bounded wait instead of stalling evaluation.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Instant, Timer, with_timeout};
use log::{debug, info, warn};

use crate::app_state::{AlarmDecision, MonitorError, SharedState};
use crate::config::{DISPLAY_QUEUE_CAPACITY, Timing};
use crate::sensors::Reading;

/// Outcome of one evaluation cycle that had a reading to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub reading: Reading,
    pub decision: AlarmDecision,
    /// Whether the reading made it into the display queue
    pub queued: bool,
}

pub struct Evaluator<'a, M: RawMutex> {
    state: &'a SharedState<M>,
    queue: Sender<'a, M, Reading, DISPLAY_QUEUE_CAPACITY>,
    timing: Timing,
}

impl<'a, M: RawMutex> Evaluator<'a, M> {
    pub fn new(
        state: &'a SharedState<M>,
        queue: Sender<'a, M, Reading, DISPLAY_QUEUE_CAPACITY>,
        timing: Timing,
    ) -> Self {
        Self {
            state,
            queue,
            timing,
        }
    }

    /// One evaluation cycle at time `now`.
    ///
    /// Returns `None` when no sensor reading has been published yet.
    pub async fn evaluate_at(&mut self, now: Instant) -> Option<Evaluation> {
        let reading = self.state.snapshot().await.last_reading?;

        let decision = if reading.breaches_limits() {
            self.state.raise_alarm(now).await
        } else {
            AlarmDecision::WithinLimits
        };
        match decision {
            AlarmDecision::Raised => info!("Limits breached at {}, alarm raised", reading),
            AlarmDecision::Suppressed => debug!("Limits breached at {}, alarm cooling down", reading),
            _ => {}
        }

        let queued = match self.forward(reading).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send data to queue: {}", e);
                false
            }
        };

        Some(Evaluation {
            reading,
            decision,
            queued,
        })
    }

    async fn forward(&self, reading: Reading) -> Result<(), MonitorError> {
        with_timeout(self.timing.queue_send_timeout(), self.queue.send(reading))
            .await
            .map_err(|_| MonitorError::QueueFull)
    }

    pub async fn run(mut self) -> ! {
        info!("Evaluator started");
        loop {
            self.evaluate_at(Instant::now()).await;
            Timer::after(self.timing.evaluation()).await;
        }
    }
}
