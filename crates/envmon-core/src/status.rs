//! Periodic status report on the diagnostic channel

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use log::info;

use crate::app_state::SharedState;
use crate::config::Timing;
use crate::display_manager::{DisplayedReading, Line};
use crate::sensors::Reading;

/// Fire-and-forget text output, typically a serial console.
pub trait DiagnosticSink {
    fn emit(&mut self, text: &str);
}

/// Sends each line to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, text: &str) {
        info!("{}", text);
    }
}

/// Read-only view of what the user currently sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Values of the last frame drawn, if any
    pub displayed: Option<Reading>,
    pub alarm_active: bool,
}

impl StatusReport {
    /// The two report lines: values, then alarm state.
    pub fn lines(&self) -> [Line; 2] {
        let mut values = Line::new();
        let _ = match self.displayed {
            Some(reading) => write!(
                values,
                "Temp: {:.2} C, Hum: {:.2} %",
                reading.temperature(),
                reading.humidity()
            ),
            None => write!(values, "Temp: -- C, Hum: -- %"),
        };

        let mut alarm = Line::new();
        let _ = alarm.push_str(if self.alarm_active {
            "ALARM: ACTIVE!"
        } else {
            "System OK"
        });

        [values, alarm]
    }
}

pub struct StatusReporter<'a, M: RawMutex, S: DiagnosticSink> {
    state: &'a SharedState<M>,
    displayed: &'a DisplayedReading<M>,
    sink: S,
    timing: Timing,
}

impl<'a, M: RawMutex, S: DiagnosticSink> StatusReporter<'a, M, S> {
    pub fn new(
        state: &'a SharedState<M>,
        displayed: &'a DisplayedReading<M>,
        sink: S,
        timing: Timing,
    ) -> Self {
        Self {
            state,
            displayed,
            sink,
            timing,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Emit one report and return what was reported.
    pub async fn report(&mut self) -> StatusReport {
        let report = StatusReport {
            displayed: self.displayed.get(),
            alarm_active: self.state.snapshot().await.alarm_active,
        };
        for line in report.lines() {
            self.sink.emit(&line);
        }
        report
    }

    pub async fn run(mut self) -> ! {
        info!("Status reporter started");
        loop {
            Timer::after(self.timing.status_report()).await;
            self.report().await;
        }
    }
}
