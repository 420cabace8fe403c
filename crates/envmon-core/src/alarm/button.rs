//! Acknowledgement button edge handling
//!
//! The button interrupt calls [`AckLatch::on_edge`]; the alarm controller
//! consumes the pending press with [`AckLatch::take`]. Electrical bounce is
//! filtered here so the controller only ever sees one event per press.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};

use crate::config::BUTTON_DEBOUNCE;

/// An accepted button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckEvent {
    /// When the edge was accepted
    pub at: Instant,
}

/// Rejects edges that follow the last accepted one too closely.
#[derive(Debug, Clone, Copy)]
pub struct AckDebouncer {
    last_accepted: Option<Instant>,
    min_gap: Duration,
}

impl AckDebouncer {
    pub const fn new(min_gap: Duration) -> Self {
        Self {
            last_accepted: None,
            min_gap,
        }
    }

    /// Accept the edge at `now` if it is strictly more than `min_gap` after
    /// the previously accepted one. Rejected edges do not move the window.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        let accepted = match self.last_accepted {
            None => true,
            Some(last) => now
                .checked_duration_since(last)
                .is_some_and(|gap| gap > self.min_gap),
        };
        if accepted {
            self.last_accepted = Some(now);
        }
        accepted
    }
}

impl Default for AckDebouncer {
    fn default() -> Self {
        Self::new(BUTTON_DEBOUNCE)
    }
}

/// Interrupt-safe, single-slot latch for acknowledgement presses.
pub struct AckLatch<M: RawMutex> {
    debouncer: BlockingMutex<M, RefCell<AckDebouncer>>,
    pending: Signal<M, AckEvent>,
}

impl<M: RawMutex> AckLatch<M> {
    pub const fn new() -> Self {
        Self {
            debouncer: BlockingMutex::new(RefCell::new(AckDebouncer::new(BUTTON_DEBOUNCE))),
            pending: Signal::new(),
        }
    }

    /// Record a falling edge. Safe to call from interrupt context.
    ///
    /// Returns whether the edge survived debouncing.
    pub fn on_edge(&self, now: Instant) -> bool {
        let accepted = self
            .debouncer
            .lock(|debouncer| debouncer.borrow_mut().try_accept(now));
        if accepted {
            self.pending.signal(AckEvent { at: now });
        }
        accepted
    }

    /// Read and clear the pending press in one step.
    pub fn take(&self) -> Option<AckEvent> {
        self.pending.try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.signaled()
    }
}

impl<M: RawMutex> Default for AckLatch<M> {
    fn default() -> Self {
        Self::new()
    }
}
