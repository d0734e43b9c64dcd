// services/infra-dash/src/refresh.rs
//
// Simulated telemetry feeds.
//
// Every mounted screen owns its timers through a handle. Dropping or stopping
// the handle aborts the task, so a screen that has been switched away from can
// never mutate its collections again. Pausing keeps the cadence running and
// only skips the mutation.

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use svckit::metrics;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Bounded random walk step: `clamp(value + U(-delta, delta), min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub delta: f64,
    pub min: f64,
    pub max: f64,
}

impl Jitter {
    pub const fn new(delta: f64, min: f64, max: f64) -> Self {
        Self { delta, min, max }
    }

    pub const fn percent(delta: f64) -> Self {
        Self::new(delta, 0.0, 100.0)
    }

    pub const fn non_negative(delta: f64) -> Self {
        Self::new(delta, 0.0, f64::INFINITY)
    }

    pub fn apply<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        let offset = if self.delta > 0.0 {
            rng.gen_range(-self.delta..=self.delta)
        } else {
            0.0
        };
        (value + offset).clamp(self.min, self.max)
    }
}

/// A collection that knows how to drift by one tick.
pub trait Perturb {
    fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R);
}

impl<T: Perturb> Perturb for Vec<T> {
    fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for item in self.iter_mut() {
            item.perturb(rng);
        }
    }
}

/// Owned background task. Aborted on `stop` or drop.
pub struct TaskHandle {
    label: &'static str,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn spawn<F>(label: &'static str, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        metrics::task_started(label);
        debug!("Task {} started", label);
        Self {
            label,
            join: Some(tokio::spawn(fut)),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |j| j.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
            metrics::task_stopped(self.label);
            debug!("Task {} stopped", self.label);
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handle to a repeating refresh timer.
pub struct Refresher {
    task: TaskHandle,
    paused: Arc<AtomicBool>,
    beats: Arc<AtomicU64>,
    applied: Arc<AtomicU64>,
}

impl Refresher {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    /// Returns the new paused state.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Timer firings, paused or not.
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    /// Firings that actually mutated state.
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&mut self) {
        self.task.stop();
    }
}

/// Runs `on_tick` every `period`, first firing one period after the call.
pub fn spawn_ticker<F>(label: &'static str, period: Duration, mut on_tick: F) -> Refresher
where
    F: FnMut(&mut StdRng) + Send + 'static,
{
    let paused = Arc::new(AtomicBool::new(false));
    let beats = Arc::new(AtomicU64::new(0));
    let applied = Arc::new(AtomicU64::new(0));

    let task = {
        let paused = paused.clone();
        let beats = beats.clone();
        let applied = applied.clone();
        TaskHandle::spawn(label, async move {
            let mut rng = StdRng::from_entropy();
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                beats.fetch_add(1, Ordering::Relaxed);
                if paused.load(Ordering::Relaxed) {
                    metrics::record_tick(label, false);
                    continue;
                }
                on_tick(&mut rng);
                applied.fetch_add(1, Ordering::Relaxed);
                metrics::record_tick(label, true);
            }
        })
    };

    Refresher {
        task,
        paused,
        beats,
        applied,
    }
}

pub fn spawn_refresh<T>(label: &'static str, period: Duration, target: Arc<RwLock<T>>) -> Refresher
where
    T: Perturb + Send + Sync + 'static,
{
    spawn_ticker(label, period, move |rng| target.write().perturb(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITORING_JITTERS: [Jitter; 4] = [
        Jitter::percent(5.0),
        Jitter::percent(4.0),
        Jitter::percent(7.5),
        Jitter::non_negative(2.5),
    ];

    #[derive(Debug, Clone, PartialEq)]
    struct Gauge(f64);

    impl Perturb for Gauge {
        fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
            self.0 = Jitter::percent(10.0).apply(self.0, rng);
        }
    }

    #[test]
    fn test_clamping_never_escapes_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for jitter in MONITORING_JITTERS {
            for start in [0.0, 0.5, 50.0, 99.9, 100.0] {
                let mut value = start;
                for _ in 0..5_000 {
                    value = jitter.apply(value, &mut rng);
                    assert!(value >= jitter.min && value <= jitter.max, "{value} escaped {jitter:?}");
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_input_is_pulled_back() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Jitter::percent(1.0).apply(250.0, &mut rng), 100.0);
        assert_eq!(Jitter::non_negative(1.0).apply(-10.0, &mut rng), 0.0);
        assert_eq!(Jitter::new(0.0, 20.0, 95.0).apply(42.0, &mut rng), 42.0);
    }

    #[test]
    fn test_perturb_vec_touches_every_item() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut gauges = vec![Gauge(50.0); 16];
        gauges.perturb(&mut rng);
        assert!(gauges.iter().any(|g| g.0 != 50.0));
        assert!(gauges.iter().all(|g| (40.0..=60.0).contains(&g.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_mutates_on_cadence() {
        let data = Arc::new(RwLock::new(vec![Gauge(50.0); 8]));
        let refresher = spawn_refresh("test-cadence", Duration::from_secs(1), data.clone());

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(refresher.applied(), 0);

        time::sleep(Duration::from_millis(2_000)).await;
        assert!(refresher.applied() >= 2);
        assert!(data.read().iter().all(|g| (0.0..=100.0).contains(&g.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_skips_mutation_but_keeps_cadence() {
        let data = Arc::new(RwLock::new(vec![Gauge(50.0); 8]));
        let refresher = spawn_refresh("test-pause", Duration::from_secs(1), data.clone());
        refresher.pause();
        let before = data.read().clone();

        time::sleep(Duration::from_millis(3_500)).await;
        assert!(refresher.beats() >= 3);
        assert_eq!(refresher.applied(), 0);
        assert_eq!(*data.read(), before);

        assert!(!refresher.toggle_pause());
        time::sleep(Duration::from_millis(1_000)).await;
        assert!(refresher.applied() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_last_snapshot() {
        let data = Arc::new(RwLock::new(vec![Gauge(50.0); 8]));
        let mut refresher = spawn_refresh("test-stop", Duration::from_secs(1), data.clone());

        time::sleep(Duration::from_millis(2_500)).await;
        refresher.stop();
        let snapshot = data.read().clone();
        let applied = refresher.applied();

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*data.read(), snapshot);
        assert_eq!(refresher.applied(), applied);
        assert!(!refresher.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_task() {
        let data = Arc::new(RwLock::new(vec![Gauge(50.0); 8]));
        let refresher = spawn_refresh("test-drop", Duration::from_secs(1), data.clone());
        drop(refresher);
        let snapshot = data.read().clone();

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*data.read(), snapshot);
        // Only the test still holds the collection once the task is gone.
        assert_eq!(Arc::strong_count(&data), 1);
    }
}
