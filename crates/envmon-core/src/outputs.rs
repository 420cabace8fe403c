//! LED and buzzer outputs

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;

/// Output pins driven by the alarm controller and the idle blink.
pub trait Outputs {
    fn set_led(&mut self, on: bool);

    /// Start a tone at the given frequency, or stop it with `None`.
    fn set_buzzer(&mut self, tone_hz: Option<u32>);
}

/// Outputs shared between the alarm controller and the blink timer.
///
/// Lock order is outputs first, then shared state, never the reverse.
pub type SharedOutputs<M, O> = Mutex<M, O>;

/// Wrap a driver for sharing.
pub const fn share<M: RawMutex, O: Outputs>(outputs: O) -> SharedOutputs<M, O> {
    Mutex::new(outputs)
}
