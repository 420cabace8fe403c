//! Status classification for a displayed reading

use crate::sensors::Reading;

/// The status line shown under the numeric readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    /// The alarm flag is set
    AlarmActive,
    /// Limits are breached but the alarm is not raised (cool-down)
    CheckValues,
    /// Everything within limits
    Ok,
}

impl StatusLine {
    /// Pick the status line for a reading.
    ///
    /// The raw limit check is applied independently of the alarm flag, so
    /// during the cool-down the display can report a problem that the alarm
    /// is not (yet) signalling.
    pub fn assess(reading: &Reading, alarm_active: bool) -> Self {
        if alarm_active {
            Self::AlarmActive
        } else if reading.breaches_limits() {
            Self::CheckValues
        } else {
            Self::Ok
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AlarmActive => "ALARM: ACTIVE!",
            Self::CheckValues => "System Issue: Check Values",
            Self::Ok => "System OK",
        }
    }
}
