//! Domain constants and task timing for the monitor
//!
//! Thresholds are fixed domain values and intentionally not configurable.
//! Task periods live in [`Timing`] so that hosts can compress time; the
//! default is the production schedule.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

/// Alarm when the temperature drops strictly below this value (°C).
pub const ALARM_TEMPERATURE_BELOW_C: f32 = 24.9;

/// Alarm when the relative humidity rises strictly above this value (%).
pub const ALARM_HUMIDITY_ABOVE_PCT: f32 = 27.0;

/// Redraw when the temperature moved more than this since the last frame (°C).
pub const REDRAW_TEMPERATURE_DELTA_C: f32 = 0.3;

/// Redraw when the humidity moved more than this since the last frame (%).
pub const REDRAW_HUMIDITY_DELTA_PCT: f32 = 2.0;

/// Readings buffered between the evaluator and the display renderer.
pub const DISPLAY_QUEUE_CAPACITY: usize = 10;

/// Buzzer tone while the alarm is active.
pub const BUZZER_FREQUENCY_HZ: u32 = 1000;

/// Minimum separation between two accepted button edges.
/// An edge exactly this far from the previous one is still a bounce.
pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(50);

/// Periods of every task and timer, in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    /// Delay between two sensor polls
    pub sensor_poll_ms: u64,
    /// Delay between two threshold evaluations
    pub evaluation_ms: u64,
    /// Longest the evaluator waits for room in the display queue
    pub queue_send_timeout_ms: u64,
    /// Delay between two alarm controller polls
    pub alarm_poll_ms: u64,
    /// How long alarms stay suppressed after an acknowledgement
    pub alarm_cooldown_ms: u64,
    /// Idle LED blink period
    pub blink_ms: u64,
    /// Status report period
    pub status_report_ms: u64,
}

impl Timing {
    /// The production schedule.
    pub const DEFAULT: Self = Self {
        sensor_poll_ms: 2_000,
        evaluation_ms: 500,
        queue_send_timeout_ms: 100,
        alarm_poll_ms: 100,
        alarm_cooldown_ms: 60_000,
        blink_ms: 500,
        status_report_ms: 10_000,
    };

    /// Name of the first task period set to zero, if any.
    ///
    /// The queue send timeout and the cool-down may be zero, every loop
    /// period must not.
    pub fn zero_period(&self) -> Option<&'static str> {
        [
            ("sensor_poll_ms", self.sensor_poll_ms),
            ("evaluation_ms", self.evaluation_ms),
            ("alarm_poll_ms", self.alarm_poll_ms),
            ("blink_ms", self.blink_ms),
            ("status_report_ms", self.status_report_ms),
        ]
        .into_iter()
        .find_map(|(name, ms)| (ms == 0).then_some(name))
    }

    pub const fn sensor_poll(&self) -> Duration {
        Duration::from_millis(self.sensor_poll_ms)
    }

    pub const fn evaluation(&self) -> Duration {
        Duration::from_millis(self.evaluation_ms)
    }

    pub const fn queue_send_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_send_timeout_ms)
    }

    pub const fn alarm_poll(&self) -> Duration {
        Duration::from_millis(self.alarm_poll_ms)
    }

    pub const fn alarm_cooldown(&self) -> Duration {
        Duration::from_millis(self.alarm_cooldown_ms)
    }

    pub const fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub const fn status_report(&self) -> Duration {
        Duration::from_millis(self.status_report_ms)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}
