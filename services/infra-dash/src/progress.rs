// services/infra-dash/src/progress.rs
//
// Stepped progress: bulk-action ramps and animated headline counters

use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use crate::refresh::TaskHandle;

/// Linear 0 -> 100 progress in fixed increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ramp {
    value: u8,
    step: u8,
}

impl Ramp {
    pub fn new(step: u8) -> Self {
        Self {
            value: 0,
            step: step.clamp(1, 100),
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_done(&self) -> bool {
        self.value >= 100
    }

    pub fn advance(&mut self) -> u8 {
        self.value = self.value.saturating_add(self.step).min(100);
        self.value
    }
}

/// Counter that climbs toward a target and stays there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Counter {
    pub value: f64,
    pub target: f64,
    pub step: f64,
}

impl Counter {
    pub fn new(target: f64, step: f64) -> Self {
        Self {
            value: 0.0,
            target,
            step,
        }
    }

    pub fn advance(&mut self) {
        self.value = (self.value + self.step).min(self.target);
    }

    pub fn is_done(&self) -> bool {
        self.value >= self.target
    }
}

/// Calls `step` every `period` until it reports completion.
pub fn spawn_stepper<F>(label: &'static str, period: Duration, mut step: F) -> TaskHandle
where
    F: FnMut() -> bool + Send + 'static,
{
    TaskHandle::spawn(label, async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if step() {
                break;
            }
        }
    })
}

/// Drives a `Ramp` on a timer, reporting each value, then runs `on_done` once
/// after the value reaches 100.
pub fn spawn_ramp<S, D>(
    label: &'static str,
    period: Duration,
    step: u8,
    mut on_step: S,
    on_done: D,
) -> TaskHandle
where
    S: FnMut(u8) + Send + 'static,
    D: FnOnce() + Send + 'static,
{
    let mut ramp = Ramp::new(step);
    let mut on_done = Some(on_done);
    spawn_stepper(label, period, move || {
        let value = ramp.advance();
        on_step(value);
        if ramp.is_done() {
            if let Some(done) = on_done.take() {
                done();
            }
            info!("{} finished", label);
            true
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_ramp_reaches_exactly_100() {
        let mut ramp = Ramp::new(30);
        let values: Vec<u8> = std::iter::from_fn(|| {
            if ramp.is_done() {
                None
            } else {
                Some(ramp.advance())
            }
        })
        .collect();
        assert_eq!(values, vec![30, 60, 90, 100]);
    }

    #[test]
    fn test_zero_step_still_progresses() {
        let mut ramp = Ramp::new(0);
        ramp.advance();
        assert_eq!(ramp.value(), 1);
    }

    #[test]
    fn test_counter_stops_at_target() {
        let mut counter = Counter::new(23.0, 2.0);
        for _ in 0..50 {
            counter.advance();
        }
        assert_eq!(counter.value, 23.0);
        assert!(counter.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ramp_reports_steps_then_completes_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let done = Arc::new(Mutex::new(0u32));

        let handle = {
            let seen = seen.clone();
            let done = done.clone();
            spawn_ramp(
                "test-ramp",
                Duration::from_millis(200),
                10,
                move |v| seen.lock().push(v),
                move || *done.lock() += 1,
            )
        };

        time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(*done.lock(), 0);

        time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(*seen.lock(), (1..=10).map(|i| i * 10).collect::<Vec<u8>>());
        assert_eq!(*done.lock(), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ramp_never_completes() {
        let done = Arc::new(Mutex::new(false));
        let mut handle = {
            let done = done.clone();
            spawn_ramp("test-ramp-stop", Duration::from_millis(200), 10, |_| {}, move || {
                *done.lock() = true
            })
        };
        time::sleep(Duration::from_millis(500)).await;
        handle.stop();
        time::sleep(Duration::from_secs(5)).await;
        assert!(!*done.lock());
    }
}
