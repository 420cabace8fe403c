//! The single lock-guarded store shared by every task

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::{Duration, Instant};

use crate::sensors::Reading;

/// Latest reading plus alarm bookkeeping.
///
/// Tasks only ever see a copy of this (see [`SharedState::snapshot`]); the
/// mutating operations live on [`SharedState`] and are split by owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorState {
    /// Most recent successful sensor reading
    pub last_reading: Option<Reading>,
    /// Set by the evaluator, cleared by the alarm controller
    pub alarm_active: bool,
    /// End of the post-acknowledgement cool-down, if one was started
    pub cooldown_until: Option<Instant>,
}

impl MonitorState {
    /// Boot state: no reading, alarm inactive.
    pub const fn new() -> Self {
        Self {
            last_reading: None,
            alarm_active: false,
            cooldown_until: None,
        }
    }

    /// Whether new alarms are still suppressed at `now`.
    pub fn cooldown_active(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of the evaluator asking to raise the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmDecision {
    /// Reading is inside the limits, nothing was asked
    WithinLimits,
    /// Flag went from clear to set
    Raised,
    /// Flag was already set
    AlreadyActive,
    /// Limits breached but the cool-down is still running
    Suppressed,
}

/// Mutex-guarded [`MonitorState`].
///
/// Critical sections are short and never span a blocking call other than the
/// display commit, which the display driver guarantees to be fast.
pub struct SharedState<M: RawMutex> {
    inner: Mutex<M, MonitorState>,
}

impl<M: RawMutex> SharedState<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(MonitorState::new()),
        }
    }

    /// Copy the current state out and release the lock.
    pub async fn snapshot(&self) -> MonitorState {
        *self.inner.lock().await
    }

    /// Hold the lock, e.g. to render a frame consistent with the alarm flag.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, M, MonitorState> {
        self.inner.lock().await
    }

    /// Overwrite the latest reading. Sensor source only.
    pub(crate) async fn publish_reading(&self, reading: Reading) {
        self.inner.lock().await.last_reading = Some(reading);
    }

    /// Set the alarm flag unless the cool-down is running. Evaluator only.
    pub(crate) async fn raise_alarm(&self, now: Instant) -> AlarmDecision {
        let mut state = self.inner.lock().await;
        if state.cooldown_active(now) {
            AlarmDecision::Suppressed
        } else if state.alarm_active {
            AlarmDecision::AlreadyActive
        } else {
            state.alarm_active = true;
            AlarmDecision::Raised
        }
    }

    /// Clear an active alarm and start the cool-down. Alarm controller only.
    ///
    /// Returns `false` without touching anything when no alarm is active.
    pub(crate) async fn acknowledge(&self, now: Instant, cooldown: Duration) -> bool {
        let mut state = self.inner.lock().await;
        if !state.alarm_active {
            return false;
        }
        state.alarm_active = false;
        state.cooldown_until = Some(now + cooldown);
        true
    }

    /// Drop an elapsed cool-down deadline. Alarm controller only.
    pub(crate) async fn finish_cooldown(&self, now: Instant) -> bool {
        let mut state = self.inner.lock().await;
        match state.cooldown_until {
            Some(until) if now >= until => {
                state.cooldown_until = None;
                true
            }
            _ => false,
        }
    }
}

impl<M: RawMutex> Default for SharedState<M> {
    fn default() -> Self {
        Self::new()
    }
}
