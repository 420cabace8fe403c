//! Display renderer task
//!
//! This module provides the task that owns the display:
//! - Receives readings from the evaluator through the bounded display queue
//! - Skips redraws when the values barely moved and no alarm is active
//! - Composes the readout and status line and commits it under the state lock
//! - Publishes the values it showed for the status reporter

use core::cell::Cell;
use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use log::{debug, error, info};

use crate::app_state::{MonitorError, SharedState};
use crate::config::{DISPLAY_QUEUE_CAPACITY, REDRAW_HUMIDITY_DELTA_PCT, REDRAW_TEMPERATURE_DELTA_C};
use crate::metrics::StatusLine;
use crate::sensors::Reading;

/// Longest line the renderer produces, in characters.
pub const LINE_CAPACITY: usize = 32;

/// Lines in a full readout frame.
pub const FRAME_LINES: usize = 3;

pub type Line = heapless::String<LINE_CAPACITY>;
pub type Frame = heapless::Vec<Line, FRAME_LINES>;

/// Shown once at boot before the first reading arrives.
pub const SPLASH_TEXT: &str = "System Starting...";

/// Character display driver.
///
/// `render` clears the screen, writes `lines` top to bottom and commits. It
/// is called with the shared state locked, so it must not block for long.
pub trait DisplayDriver {
    type Error: fmt::Debug;

    fn render(&mut self, lines: &[Line]) -> Result<(), Self::Error>;
}

/// Values most recently put on screen, readable by other tasks.
pub struct DisplayedReading<M: RawMutex> {
    inner: BlockingMutex<M, Cell<Option<Reading>>>,
}

impl<M: RawMutex> DisplayedReading<M> {
    pub const fn new() -> Self {
        Self {
            inner: BlockingMutex::new(Cell::new(None)),
        }
    }

    pub fn get(&self) -> Option<Reading> {
        self.inner.lock(|shown| shown.get())
    }

    fn set(&self, reading: Reading) {
        self.inner.lock(|shown| shown.set(Some(reading)));
    }
}

impl<M: RawMutex> Default for DisplayedReading<M> {
    fn default() -> Self {
        Self::new()
    }
}

fn line(args: fmt::Arguments<'_>) -> Line {
    let mut line = Line::new();
    let _ = line.write_fmt(args);
    line
}

/// Build the readout frame: temperature, humidity, status.
pub fn compose(reading: &Reading, alarm_active: bool) -> Frame {
    let status = StatusLine::assess(reading, alarm_active);
    [
        line(format_args!("Temp: {:.2} C", reading.temperature())),
        line(format_args!("Hum: {:.2} %", reading.humidity())),
        line(format_args!("{}", status.label())),
    ]
    .into_iter()
    .collect()
}

/// Owns the display and redraws it from queued readings.
pub struct DisplayRenderer<'a, M: RawMutex, D: DisplayDriver> {
    state: &'a SharedState<M>,
    queue: Receiver<'a, M, Reading, DISPLAY_QUEUE_CAPACITY>,
    displayed: &'a DisplayedReading<M>,
    display: D,
    last_shown: Option<Reading>,
}

impl<'a, M: RawMutex, D: DisplayDriver> DisplayRenderer<'a, M, D> {
    pub fn new(
        state: &'a SharedState<M>,
        queue: Receiver<'a, M, Reading, DISPLAY_QUEUE_CAPACITY>,
        displayed: &'a DisplayedReading<M>,
        display: D,
    ) -> Self {
        Self {
            state,
            queue,
            displayed,
            display,
            last_shown: None,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Redraw when either value moved past its threshold since the last
    /// frame, or unconditionally while the alarm is active.
    pub fn needs_redraw(&self, reading: &Reading, alarm_active: bool) -> bool {
        if alarm_active {
            return true;
        }
        match self.last_shown {
            None => true,
            Some(shown) => {
                (reading.temperature() - shown.temperature()).abs() > REDRAW_TEMPERATURE_DELTA_C
                    || (reading.humidity() - shown.humidity()).abs() > REDRAW_HUMIDITY_DELTA_PCT
            }
        }
    }

    /// Draw the boot splash.
    pub fn splash(&mut self) -> Result<(), MonitorError> {
        let frame: Frame = [line(format_args!("{}", SPLASH_TEXT))].into_iter().collect();
        self.display.render(&frame).map_err(|e| {
            error!("Display init failed: {:?}", e);
            MonitorError::Display
        })
    }

    /// Show one reading if it warrants a redraw. Returns whether it was drawn.
    pub async fn show(&mut self, reading: Reading) -> Result<bool, MonitorError> {
        let state = self.state.lock().await;
        if !self.needs_redraw(&reading, state.alarm_active) {
            debug!("Skipping redraw for {}", reading);
            return Ok(false);
        }

        let frame = compose(&reading, state.alarm_active);
        self.display.render(&frame).map_err(|e| {
            error!("Display render failed: {:?}", e);
            MonitorError::Display
        })?;
        drop(state);

        self.last_shown = Some(reading);
        self.displayed.set(reading);
        Ok(true)
    }

    /// Wait for the next queued reading and show it.
    pub async fn process_next(&mut self) -> Result<bool, MonitorError> {
        let reading = self.queue.receive().await;
        self.show(reading).await
    }

    pub async fn run(mut self) -> ! {
        info!("Display renderer started");
        loop {
            // Errors are logged where they happen, the next reading retries
            let _ = self.process_next().await;
        }
    }
}
