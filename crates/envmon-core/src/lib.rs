//! Hardware-independent core library for envmon
//!
//! This crate contains all platform-agnostic logic for the envmon
//! temperature/humidity alarm monitor: the shared state protocol, the sensor
//! sampling task, threshold evaluation, display rendering, the alarm
//! controller and its acknowledgement handling, the idle blink timer and the
//! periodic status report.
//!
//! Every task is an async loop built on `embassy-sync` primitives and
//! `embassy-time` timers, so the same code runs on a microcontroller executor
//! and on the desktop simulator. Hardware is reached only through the
//! [`sensors::Sensor`], [`display_manager::DisplayDriver`],
//! [`outputs::Outputs`] and [`status::DiagnosticSink`] traits.
//!
//! It is `#![no_std]` outside of tests so it compiles on both embedded
//! targets and desktop hosts.

#![cfg_attr(not(test), no_std)]

pub mod alarm;
pub mod app_state;
pub mod blink;
pub mod config;
pub mod display_manager;
pub mod evaluator;
pub mod metrics;
pub mod outputs;
pub mod sampling;
pub mod sensors;
pub mod status;

pub use app_state::{Monitor, MonitorError, MonitorState, SharedState};
pub use config::Timing;
pub use sensors::{Reading, Sensor, SensorError};
