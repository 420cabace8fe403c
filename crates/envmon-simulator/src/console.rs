//! Terminal stand-ins for the display, LED and buzzer.

use std::convert::Infallible;
use std::io::Write;

use envmon_core::display_manager::{DisplayDriver, LINE_CAPACITY, Line};
use envmon_core::outputs::Outputs;
use log::info;

/// Prints each committed frame as a boxed block on stdout.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    frames: u64,
}

impl DisplayDriver for ConsoleDisplay {
    type Error = Infallible;

    fn render(&mut self, lines: &[Line]) -> Result<(), Infallible> {
        self.frames += 1;
        let border = "-".repeat(LINE_CAPACITY + 2);
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth stopping the monitor for
        let _ = writeln!(out, "+{}+ frame {}", border, self.frames);
        for line in lines {
            let _ = writeln!(out, "| {:<width$} |", line.as_str(), width = LINE_CAPACITY);
        }
        let _ = writeln!(out, "+{}+", border);
        Ok(())
    }
}

/// Logs LED and buzzer changes. Repeated writes of the same value are quiet.
#[derive(Debug, Default)]
pub struct ConsoleOutputs {
    led: bool,
    buzzer: Option<u32>,
}

impl Outputs for ConsoleOutputs {
    fn set_led(&mut self, on: bool) {
        if self.led != on {
            self.led = on;
            info!("LED {}", if on { "on" } else { "off" });
        }
    }

    fn set_buzzer(&mut self, tone_hz: Option<u32>) {
        if self.buzzer != tone_hz {
            self.buzzer = tone_hz;
            match tone_hz {
                Some(hz) => info!("Buzzer on at {} Hz", hz),
                None => info!("Buzzer off"),
            }
        }
    }
}
