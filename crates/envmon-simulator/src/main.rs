//! Desktop simulator for the envmon alarm monitor.
//!
//! Runs the envmon-core tasks on two embassy executors, one per priority
//! class, against a synthetic sensor and console stand-ins for the display,
//! LED and buzzer.
//!
//! | Executor | Tasks                                               |
//! |----------|-----------------------------------------------------|
//! | high     | sensor source, alarm controller                     |
//! | normal   | evaluator, display renderer, blink, status reporter |
//!
//! Press Enter to acknowledge an alarm. An optional JSON config file path may
//! be given as the first argument (see [`config::SimulatorConfig`]).

mod config;
mod console;
mod mock_sensor;

use std::io::BufRead;
use std::path::PathBuf;

use embassy_executor::{Executor, Spawner};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Timer};
use envmon_core::alarm::{AckLatch, AlarmController};
use envmon_core::blink::BlinkTimer;
use envmon_core::display_manager::DisplayRenderer;
use envmon_core::evaluator::Evaluator;
use envmon_core::outputs::{SharedOutputs, share};
use envmon_core::sampling::SensorSource;
use envmon_core::status::{LogSink, StatusReporter};
use envmon_core::Monitor;
use log::{debug, error, info};
use static_cell::StaticCell;

use crate::config::SimulatorConfig;
use crate::console::{ConsoleDisplay, ConsoleOutputs};
use crate::mock_sensor::MockSensor;

type SimRawMutex = CriticalSectionRawMutex;

static MONITOR: StaticCell<Monitor<SimRawMutex>> = StaticCell::new();
static OUTPUTS: StaticCell<SharedOutputs<SimRawMutex, ConsoleOutputs>> = StaticCell::new();
static HIGH_PRIORITY: StaticCell<Executor> = StaticCell::new();
static NORMAL_PRIORITY: StaticCell<Executor> = StaticCell::new();

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[embassy_executor::task]
async fn sensor_task(source: SensorSource<'static, SimRawMutex, MockSensor>) {
    source.run().await
}

#[embassy_executor::task]
async fn alarm_task(controller: AlarmController<'static, SimRawMutex, ConsoleOutputs>) {
    controller.run().await
}

#[embassy_executor::task]
async fn evaluator_task(evaluator: Evaluator<'static, SimRawMutex>) {
    evaluator.run().await
}

#[embassy_executor::task]
async fn display_task(renderer: DisplayRenderer<'static, SimRawMutex, ConsoleDisplay>) {
    renderer.run().await
}

#[embassy_executor::task]
async fn blink_task(blink: BlinkTimer<'static, SimRawMutex, ConsoleOutputs>) {
    blink.run().await
}

#[embassy_executor::task]
async fn status_task(reporter: StatusReporter<'static, SimRawMutex, LogSink>) {
    reporter.run().await
}

/// Replays configured button presses relative to `start`.
#[embassy_executor::task]
async fn scripted_presses_task(
    ack: &'static AckLatch<SimRawMutex>,
    start: Instant,
    presses_ms: &'static [u64],
) {
    for &offset in presses_ms {
        Timer::at(start + Duration::from_millis(offset)).await;
        let accepted = ack.on_edge(Instant::now());
        info!("Scripted button press at +{} ms (accepted: {})", offset, accepted);
    }
}

#[embassy_executor::task]
async fn shutdown_task(after: Duration) {
    Timer::after(after).await;
    info!("Run time elapsed, simulator exiting");
    std::process::exit(0);
}

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// Every line on stdin counts as one falling edge.
fn spawn_stdin_button(ack: &'static AckLatch<SimRawMutex>) {
    let spawned = std::thread::Builder::new()
        .name("button".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                if ack.on_edge(Instant::now()) {
                    info!("Button edge accepted");
                } else {
                    debug!("Button edge rejected as bounce");
                }
            }
        });
    if let Err(e) = spawned {
        error!("Failed to start button thread: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match SimulatorConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Starting envmon simulator");
    info!("Timing: {:?}", config.timing);
    info!("Press Enter to acknowledge an alarm");

    let monitor: &'static Monitor<SimRawMutex> = MONITOR.init(Monitor::new(config.timing));
    let outputs: &'static SharedOutputs<SimRawMutex, ConsoleOutputs> =
        OUTPUTS.init(share(ConsoleOutputs::default()));

    let mut renderer = monitor.display_renderer(ConsoleDisplay::default());
    if renderer.splash().is_err() {
        std::process::exit(1);
    }

    let source = monitor.sensor_source(MockSensor::new(config.sensor));
    let controller = monitor.alarm_controller(outputs);

    let high = std::thread::Builder::new()
        .name("high-priority".into())
        .spawn(move || {
            let executor = HIGH_PRIORITY.init(Executor::new());
            executor.run(|spawner| {
                spawner.spawn(sensor_task(source)).unwrap();
                spawner.spawn(alarm_task(controller)).unwrap();
            });
        });
    if let Err(e) = high {
        error!("Failed to start high-priority executor: {}", e);
        std::process::exit(1);
    }

    spawn_stdin_button(monitor.ack_latch());

    let start = Instant::now();
    let presses: &'static [u64] = config.presses_ms.leak();
    let run_for = config.run_for_secs.map(Duration::from_secs);

    let executor = NORMAL_PRIORITY.init(Executor::new());
    executor.run(|spawner: Spawner| {
        spawner.spawn(evaluator_task(monitor.evaluator())).unwrap();
        spawner.spawn(display_task(renderer)).unwrap();
        spawner.spawn(blink_task(monitor.blink_timer(outputs))).unwrap();
        spawner.spawn(status_task(monitor.status_reporter(LogSink))).unwrap();
        if !presses.is_empty() {
            spawner.spawn(scripted_presses_task(monitor.ack_latch(), start, presses)).unwrap();
        }
        if let Some(after) = run_for {
            spawner.spawn(shutdown_task(after)).unwrap();
        }
    });
}
