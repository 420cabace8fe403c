//! Alarm output control and acknowledgement
//!
//! The controller owns the alarm session state machine:
//!
//! | From       | Event                        | To         | Side effect                        |
//! |------------|------------------------------|------------|------------------------------------|
//! | Idle       | alarm flag observed set      | Active     | LED solid, buzzer tone             |
//! | Active     | acknowledgement accepted     | Debouncing | clear flag, outputs off, cool-down |
//! | Debouncing | cool-down elapsed            | Idle       | alarms may be raised again         |
//! | Idle/Debouncing | acknowledgement         | unchanged  | none                               |
//!
//! Raising the flag is the evaluator's job; clearing it happens only here.

mod button;

pub use button::*;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Instant, Timer};
use log::{debug, info};

use crate::app_state::SharedState;
use crate::config::{BUZZER_FREQUENCY_HZ, Timing};
use crate::outputs::Outputs;

/// Alarm session as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmSession {
    /// No alarm, outputs free for the idle blink
    Idle,
    /// Alarm raised, LED solid and buzzer sounding
    Active,
    /// Acknowledged, new alarms suppressed until the cool-down ends
    Debouncing,
}

/// Drives the LED and buzzer from the shared alarm flag and handles
/// acknowledgement presses.
pub struct AlarmController<'a, M: RawMutex, O: Outputs> {
    state: &'a SharedState<M>,
    ack: &'a AckLatch<M>,
    outputs: &'a Mutex<M, O>,
    timing: Timing,
    session: AlarmSession,
}

impl<'a, M: RawMutex, O: Outputs> AlarmController<'a, M, O> {
    pub fn new(
        state: &'a SharedState<M>,
        ack: &'a AckLatch<M>,
        outputs: &'a Mutex<M, O>,
        timing: Timing,
    ) -> Self {
        Self {
            state,
            ack,
            outputs,
            timing,
            session: AlarmSession::Idle,
        }
    }

    pub fn session(&self) -> AlarmSession {
        self.session
    }

    /// One controller cycle at time `now`.
    ///
    /// Picks up a freshly raised alarm, then consumes any pending
    /// acknowledgement, then ends an elapsed cool-down. A press pending when
    /// the alarm is first picked up was made before it sounded and is
    /// discarded.
    pub async fn poll_at(&mut self, now: Instant) -> AlarmSession {
        // Only a press seen while the alarm was already sounding acknowledges
        let was_active = self.session == AlarmSession::Active;

        let snapshot = self.state.snapshot().await;
        if snapshot.alarm_active && !was_active {
            info!("Alarm raised ({:?})", snapshot.last_reading);
            self.sound().await;
            self.session = AlarmSession::Active;
        }

        // A press is always consumed so it cannot acknowledge a later alarm
        if let Some(event) = self.ack.take() {
            if was_active && self.state.acknowledge(now, self.timing.alarm_cooldown()).await {
                info!("Button pressed, alarm cleared.");
                self.silence().await;
                self.session = AlarmSession::Debouncing;
            } else {
                debug!(
                    "Ignoring button press at {} ms, no active alarm",
                    event.at.as_millis()
                );
            }
        }

        if self.session == AlarmSession::Debouncing && self.state.finish_cooldown(now).await {
            info!("Alarm cool-down elapsed, alarms re-armed");
            self.session = AlarmSession::Idle;
        }

        self.session
    }

    async fn sound(&self) {
        let mut outputs = self.outputs.lock().await;
        outputs.set_led(true);
        outputs.set_buzzer(Some(BUZZER_FREQUENCY_HZ));
    }

    async fn silence(&self) {
        let mut outputs = self.outputs.lock().await;
        outputs.set_buzzer(None);
        outputs.set_led(false);
    }

    pub async fn run(mut self) -> ! {
        info!("Alarm controller started");
        loop {
            self.poll_at(Instant::now()).await;
            Timer::after(self.timing.alarm_poll()).await;
        }
    }
}
