//! Idle indicator blink
//!
//! Toggles the LED on a fixed period while no alarm is active. The alarm
//! flag is checked while the outputs are locked, so the controller's solid-on
//! always wins and the two never interleave.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use log::info;

use crate::app_state::SharedState;
use crate::config::Timing;
use crate::outputs::{Outputs, SharedOutputs};

pub struct BlinkTimer<'a, M: RawMutex, O: Outputs> {
    state: &'a SharedState<M>,
    outputs: &'a SharedOutputs<M, O>,
    timing: Timing,
    led_on: bool,
}

impl<'a, M: RawMutex, O: Outputs> BlinkTimer<'a, M, O> {
    pub fn new(state: &'a SharedState<M>, outputs: &'a SharedOutputs<M, O>, timing: Timing) -> Self {
        Self {
            state,
            outputs,
            timing,
            led_on: false,
        }
    }

    /// One timer expiry. Returns whether the LED was written.
    pub async fn tick(&mut self) -> bool {
        let mut outputs = self.outputs.lock().await;
        if self.state.snapshot().await.alarm_active {
            return false;
        }
        outputs.set_led(self.led_on);
        self.led_on = !self.led_on;
        true
    }

    pub async fn run(mut self) -> ! {
        info!("Blink timer started");
        loop {
            Timer::after(self.timing.blink()).await;
            self.tick().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::tests::RecordingOutputs;
    use crate::outputs::share;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Instant;

    #[test]
    fn test_toggles_while_idle() {
        let state = SharedState::<CriticalSectionRawMutex>::new();
        let outputs = share::<CriticalSectionRawMutex, _>(RecordingOutputs::default());
        let mut blink = BlinkTimer::new(&state, &outputs, Timing::default());
        block_on(async {
            assert!(blink.tick().await);
            assert!(!outputs.lock().await.led);
            assert!(blink.tick().await);
            assert!(outputs.lock().await.led);
            assert!(blink.tick().await);
            assert!(!outputs.lock().await.led);
        });
    }

    #[test]
    fn test_suppressed_while_alarm_active() {
        let state = SharedState::<CriticalSectionRawMutex>::new();
        let outputs = share::<CriticalSectionRawMutex, _>(RecordingOutputs::default());
        let mut blink = BlinkTimer::new(&state, &outputs, Timing::default());
        block_on(async {
            state.raise_alarm(Instant::from_secs(1)).await;
            assert!(!blink.tick().await);
            assert!(!blink.tick().await);
            assert_eq!(outputs.lock().await.led_writes, 0);
        });
    }
}
