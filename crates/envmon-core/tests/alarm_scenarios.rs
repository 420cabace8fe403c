//! End-to-end alarm scenarios driven through the public `Monitor` API.

use std::collections::VecDeque;
use std::convert::Infallible;

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant};

use envmon_core::alarm::AlarmSession;
use envmon_core::app_state::AlarmDecision;
use envmon_core::config::{BUZZER_FREQUENCY_HZ, DISPLAY_QUEUE_CAPACITY};
use envmon_core::display_manager::{DisplayDriver, Line};
use envmon_core::outputs::{Outputs, share};
use envmon_core::status::DiagnosticSink;
use envmon_core::{Monitor, Reading, Sensor, SensorError, Timing};

type Mon = Monitor<CriticalSectionRawMutex>;

struct ScriptedSensor {
    script: VecDeque<Result<Reading, SensorError>>,
}

impl ScriptedSensor {
    fn repeating(reading: Reading, times: usize) -> Self {
        Self {
            script: std::iter::repeat_n(Ok(reading), times).collect(),
        }
    }

    fn sequence(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self {
            script: readings.into_iter().map(Ok).collect(),
        }
    }
}

impl Sensor for ScriptedSensor {
    async fn read(&mut self) -> Result<Reading, SensorError> {
        self.script.pop_front().unwrap_or(Err(SensorError::ReadFailed {
            sensor: "scripted",
            details: "script exhausted",
        }))
    }
}

#[derive(Default)]
struct PinLog {
    led: bool,
    buzzer: Option<u32>,
}

impl Outputs for PinLog {
    fn set_led(&mut self, on: bool) {
        self.led = on;
    }

    fn set_buzzer(&mut self, tone_hz: Option<u32>) {
        self.buzzer = tone_hz;
    }
}

#[derive(Default)]
struct ScreenLog {
    frames: Vec<Vec<String>>,
}

impl DisplayDriver for ScreenLog {
    type Error = Infallible;

    fn render(&mut self, lines: &[Line]) -> Result<(), Infallible> {
        self.frames
            .push(lines.iter().map(|line| line.as_str().to_owned()).collect());
        Ok(())
    }
}

#[derive(Default)]
struct Serial {
    lines: Vec<String>,
}

impl DiagnosticSink for Serial {
    fn emit(&mut self, text: &str) {
        self.lines.push(text.to_owned());
    }
}

fn reading(temperature: f32, humidity: f32) -> Reading {
    Reading::new(temperature, humidity).unwrap()
}

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

#[test]
fn comfortable_reading_shows_system_ok() {
    let monitor = Mon::new(Timing::default());
    let mut source = monitor.sensor_source(ScriptedSensor::repeating(reading(25.5, 20.0), 1));
    let mut evaluator = monitor.evaluator();
    let mut renderer = monitor.display_renderer(ScreenLog::default());

    block_on(async {
        source.sample().await.unwrap();
        let evaluation = evaluator.evaluate_at(at(500)).await.unwrap();
        assert_eq!(evaluation.decision, AlarmDecision::WithinLimits);
        assert!(renderer.process_next().await.unwrap());
    });

    assert_eq!(
        renderer.display().frames,
        [["Temp: 25.50 C", "Hum: 20.00 %", "System OK"]]
    );
    assert!(!block_on(monitor.state().snapshot()).alarm_active);
}

#[test]
fn acknowledged_alarm_stays_quiet_for_the_cooldown() {
    let timing = Timing::default();
    let monitor = Mon::new(timing);
    let outputs = share::<CriticalSectionRawMutex, _>(PinLog::default());
    let mut source = monitor.sensor_source(ScriptedSensor::repeating(reading(24.5, 20.0), 1));
    let mut evaluator = monitor.evaluator();
    let mut controller = monitor.alarm_controller(&outputs);
    let mut renderer = monitor.display_renderer(ScreenLog::default());

    block_on(async {
        source.sample().await.unwrap();

        // Raised within one evaluation cycle and picked up by the controller
        let raised = evaluator.evaluate_at(at(500)).await.unwrap();
        assert_eq!(raised.decision, AlarmDecision::Raised);
        assert_eq!(controller.poll_at(at(600)).await, AlarmSession::Active);
        {
            let pins = outputs.lock().await;
            assert!(pins.led);
            assert_eq!(pins.buzzer, Some(BUZZER_FREQUENCY_HZ));
        }
        assert!(renderer.process_next().await.unwrap());

        // Flag stays set across further cycles until acknowledged
        for ms in [1_000, 1_500, 2_000] {
            evaluator.evaluate_at(at(ms)).await;
            assert_eq!(controller.poll_at(at(ms)).await, AlarmSession::Active);
            assert!(monitor.state().snapshot().await.alarm_active);
        }

        let ack_at = at(2_050);
        assert!(monitor.ack_latch().on_edge(ack_at));
        assert!(!monitor.ack_latch().on_edge(at(2_080)));
        assert_eq!(controller.poll_at(ack_at).await, AlarmSession::Debouncing);
        assert!(!monitor.state().snapshot().await.alarm_active);
        {
            let pins = outputs.lock().await;
            assert!(!pins.led);
            assert_eq!(pins.buzzer, None);
        }

        // One second later the same reading does not re-raise
        let quiet = evaluator.evaluate_at(ack_at + Duration::from_secs(1)).await.unwrap();
        assert_eq!(quiet.decision, AlarmDecision::Suppressed);
        assert!(!monitor.state().snapshot().await.alarm_active);

        let just_before = ack_at + timing.alarm_cooldown() - Duration::from_millis(1);
        let still_quiet = evaluator.evaluate_at(just_before).await.unwrap();
        assert_eq!(still_quiet.decision, AlarmDecision::Suppressed);

        // Once the cool-down is over it does
        let expiry = ack_at + timing.alarm_cooldown();
        assert_eq!(controller.poll_at(expiry).await, AlarmSession::Idle);
        let rearmed = evaluator.evaluate_at(expiry).await.unwrap();
        assert_eq!(rearmed.decision, AlarmDecision::Raised);
        assert_eq!(controller.poll_at(expiry).await, AlarmSession::Active);
    });
}

#[test]
fn display_reports_issue_while_alarm_is_suppressed() {
    let monitor = Mon::new(Timing::default());
    let outputs = share::<CriticalSectionRawMutex, _>(PinLog::default());
    let mut source = monitor.sensor_source(ScriptedSensor::sequence([
        reading(25.5, 30.0),
        reading(25.0, 30.0),
    ]));
    let mut evaluator = monitor.evaluator();
    let mut controller = monitor.alarm_controller(&outputs);
    let mut renderer = monitor.display_renderer(ScreenLog::default());
    let mut reporter = monitor.status_reporter(Serial::default());

    block_on(async {
        source.sample().await.unwrap();
        evaluator.evaluate_at(at(0)).await;
        controller.poll_at(at(0)).await;
        assert!(renderer.process_next().await.unwrap());

        monitor.ack_latch().on_edge(at(100));
        assert_eq!(controller.poll_at(at(100)).await, AlarmSession::Debouncing);

        // Zero delta and no alarm: the display keeps the old frame
        let stale = evaluator.evaluate_at(at(600)).await.unwrap();
        assert_eq!(stale.decision, AlarmDecision::Suppressed);
        assert!(!renderer.process_next().await.unwrap());

        // Still out of limits and 0.5 C colder: redrawn without the banner
        source.sample().await.unwrap();
        let moved = evaluator.evaluate_at(at(2_100)).await.unwrap();
        assert_eq!(moved.decision, AlarmDecision::Suppressed);
        assert!(renderer.process_next().await.unwrap());
        reporter.report().await;
    });

    let frames = &renderer.display().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0][2], "ALARM: ACTIVE!");
    assert_eq!(
        frames[1],
        ["Temp: 25.00 C", "Hum: 30.00 %", "System Issue: Check Values"]
    );
    // The report follows the flag, not the raw limits
    assert_eq!(
        reporter.sink().lines,
        ["Temp: 25.00 C, Hum: 30.00 %", "System OK"]
    );
}

#[test]
fn full_queue_bounds_the_evaluator() {
    let monitor = Mon::new(Timing::default());
    let mut source = monitor.sensor_source(ScriptedSensor::repeating(reading(25.5, 20.0), 1));
    let mut evaluator = monitor.evaluator();

    block_on(async {
        source.sample().await.unwrap();
        for _ in 0..DISPLAY_QUEUE_CAPACITY {
            assert!(evaluator.evaluate_at(at(0)).await.unwrap().queued);
        }

        // Measured on the same clock the send timeout runs on
        let started = Instant::now();
        let dropped = evaluator.evaluate_at(at(0)).await.unwrap();
        let waited = started.elapsed();

        assert!(!dropped.queued);
        assert!(waited >= Timing::default().queue_send_timeout());
        assert!(waited < Duration::from_secs(2));
    });
    assert_eq!(monitor.queued_readings(), DISPLAY_QUEUE_CAPACITY);
}

#[test]
fn sensor_failure_keeps_last_reading_and_is_reported() {
    let monitor = Mon::new(Timing::default());
    let mut source = monitor.sensor_source(ScriptedSensor::repeating(reading(25.5, 20.0), 1));
    let mut evaluator = monitor.evaluator();
    let mut renderer = monitor.display_renderer(ScreenLog::default());
    let mut reporter = monitor.status_reporter(Serial::default());

    block_on(async {
        source.sample().await.unwrap();
        assert!(source.sample().await.is_err());
        assert_eq!(
            monitor.state().snapshot().await.last_reading,
            Some(reading(25.5, 20.0))
        );

        evaluator.evaluate_at(at(500)).await;
        renderer.process_next().await.unwrap();
        reporter.report().await;
    });

    assert_eq!(
        reporter.sink().lines,
        ["Temp: 25.50 C, Hum: 20.00 %", "System OK"]
    );
}
