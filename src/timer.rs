//! The timer core.
//!
//! A [`KeepAwake`] controller owns shared timer state and spawns one
//! background loop task per run. The loop presses the configured key each
//! interval, counts successful presses, and winds down the remaining run
//! time until it is exhausted or the run is stopped. Control operations
//! (pause, resume, stop, reset) flip shared atomics that the loop observes
//! at its next cycle, so stopping takes effect within one interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AwakeError, Result};
use crate::key_sender::KeyPress;

/// Sentinel for "no run time limit" in the millisecond counters.
const UNBOUNDED: u64 = u64::MAX;

fn to_millis(duration: Duration) -> u64 {
    duration.as_millis().min((UNBOUNDED - 1) as u128) as u64
}

/// Shared timer state, jointly owned by the controller, the loop task, and
/// any [`TimerHandle`] clones. Durations are tracked as whole milliseconds
/// so every field can be a lock-free atomic.
#[derive(Debug)]
struct Shared {
    key: String,
    interval_ms: AtomicU64,
    run_time_ms: AtomicU64,
    remaining_ms: AtomicU64,
    press_count: AtomicU64,
    running: AtomicBool,
    paused: AtomicBool,
}

impl Shared {
    fn new(config: &Config) -> Self {
        let run_time_ms = config.run_time.map_or(UNBOUNDED, to_millis);
        Self {
            key: config.key.clone(),
            interval_ms: AtomicU64::new(to_millis(config.interval)),
            run_time_ms: AtomicU64::new(run_time_ms),
            remaining_ms: AtomicU64::new(run_time_ms),
            press_count: AtomicU64::new(0),
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::SeqCst))
    }

    fn run_time(&self) -> Option<Duration> {
        match self.run_time_ms.load(Ordering::SeqCst) {
            UNBOUNDED => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    fn remaining(&self) -> Option<Duration> {
        match self.remaining_ms.load(Ordering::SeqCst) {
            UNBOUNDED => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    fn press_count(&self) -> u64 {
        self.press_count.load(Ordering::SeqCst)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn has_time_left(&self) -> bool {
        // UNBOUNDED never reaches zero through decrements.
        self.remaining_ms.load(Ordering::SeqCst) != 0
    }

    /// Arm the state for a fresh run.
    fn begin(&self) {
        self.press_count.store(0, Ordering::SeqCst);
        self.remaining_ms
            .store(self.run_time_ms.load(Ordering::SeqCst), Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    /// Drive the state to its idempotent terminal form.
    fn terminate(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.remaining_ms.store(0, Ordering::SeqCst);
    }

    /// Consume one interval of remaining run time, clamped at zero. A
    /// single atomic read-modify-write, so a controller write landing
    /// mid-decrement (reset, resume, stop) is never overwritten with a
    /// stale value.
    fn consume(&self, interval: Duration) {
        let _ = self
            .remaining_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                (left != UNBOUNDED).then(|| left.saturating_sub(to_millis(interval)))
            });
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        info!("timer paused");
    }

    /// Clear the pause flag and re-derive the remaining run time from the
    /// press count: every counted press stands for one elapsed interval.
    fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        let run_time = self.run_time_ms.load(Ordering::SeqCst);
        if run_time != UNBOUNDED {
            let elapsed = self
                .interval_ms
                .load(Ordering::SeqCst)
                .saturating_mul(self.press_count.load(Ordering::SeqCst));
            self.remaining_ms
                .store(run_time.saturating_sub(elapsed), Ordering::SeqCst);
        }
        info!("timer resumed");
    }

    fn stop(&self) {
        info!("stop requested");
        self.terminate();
    }

    /// Restore the remaining run time to the configured run time. Leaves
    /// the press count untouched.
    fn reset_timer(&self) {
        self.remaining_ms
            .store(self.run_time_ms.load(Ordering::SeqCst), Ordering::SeqCst);
        info!("timer reset");
    }
}

/// The background press loop. Runs until the remaining run time is
/// exhausted or the run flag is cleared; a failed press aborts the run and
/// surfaces through [`KeepAwake::join`].
async fn run_loop(shared: Arc<Shared>, sender: Arc<dyn KeyPress>) -> Result<()> {
    while shared.is_running() && shared.has_time_left() {
        let interval = shared.interval();

        if shared.is_paused() {
            // No press, no decrement while paused; just re-check later.
            sleep(interval).await;
            continue;
        }

        if let Err(err) = sender.press_key(&shared.key) {
            error!(key = %shared.key, error = %err, "key press failed, aborting run");
            shared.terminate();
            return Err(err);
        }
        let count = shared.press_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(key = %shared.key, count, "key press");

        sleep(interval).await;
        shared.consume(interval);

        match shared.remaining() {
            Some(left) => info!(remaining_secs = left.as_secs_f64(), "time remaining"),
            None => debug!("time remaining: unbounded"),
        }
    }

    shared.terminate();
    Ok(())
}

/// Controller for the keep-awake timer.
///
/// Owns the shared state and the loop task. At most one loop task is active
/// at a time: [`start`](Self::start) on a live run returns
/// [`AwakeError::TimerAlreadyRunning`]. After a run has ended (naturally or
/// via [`stop`](Self::stop)), `start` begins a fresh run.
pub struct KeepAwake {
    shared: Arc<Shared>,
    sender: Arc<dyn KeyPress>,
    task: Option<JoinHandle<Result<()>>>,
}

impl std::fmt::Debug for KeepAwake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepAwake")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

impl KeepAwake {
    pub fn new(config: &Config, sender: Arc<dyn KeyPress>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config)),
            sender,
            task: None,
        })
    }

    /// Start a run with the configured interval and run time.
    pub fn start(&mut self) -> Result<()> {
        self.start_with(None, None)
    }

    /// Start a run, optionally overriding the interval and/or the run time
    /// for this and subsequent runs.
    pub fn start_with(
        &mut self,
        interval: Option<Duration>,
        run_time: Option<Duration>,
    ) -> Result<()> {
        if self.shared.is_running() || self.task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Err(AwakeError::TimerAlreadyRunning);
        }

        if let Some(interval) = interval {
            if interval.is_zero() {
                return Err(AwakeError::config_validation("interval must be positive"));
            }
            self.shared
                .interval_ms
                .store(to_millis(interval), Ordering::SeqCst);
        }
        if let Some(run_time) = run_time {
            if run_time.is_zero() {
                return Err(AwakeError::config_validation("run time must be positive"));
            }
            self.shared
                .run_time_ms
                .store(to_millis(run_time), Ordering::SeqCst);
        }

        self.shared.begin();
        match self.shared.run_time() {
            Some(run_time) => info!(
                key = %self.shared.key,
                run_secs = run_time.as_secs_f64(),
                "starting key press interval"
            ),
            None => info!(key = %self.shared.key, "starting key press interval (unbounded)"),
        }

        self.task = Some(tokio::spawn(run_loop(
            self.shared.clone(),
            self.sender.clone(),
        )));
        Ok(())
    }

    /// Request the run to stop. Returns immediately; the loop observes the
    /// flag within one interval.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Suspend pressing without consuming run time. Idempotent.
    pub fn pause(&self) {
        self.shared.pause();
    }

    /// Resume pressing. The remaining run time is re-derived from the
    /// press count (run time minus presses times interval), treating every
    /// counted press as one elapsed interval.
    pub fn resume(&self) {
        self.shared.resume();
    }

    /// Restore the remaining run time to the configured run time.
    pub fn reset_timer(&self) {
        self.shared.reset_timer();
    }

    /// Wait for the loop task to finish. Propagates a fatal key press
    /// failure from the loop. Blocks indefinitely on an unbounded run
    /// unless [`stop`](Self::stop) is called.
    pub async fn join(&mut self) -> Result<()> {
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| AwakeError::TaskJoin(e.to_string()))?,
            None => Ok(()),
        }
    }

    /// A cheap clonable handle for controlling the timer from other tasks.
    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn press_count(&self) -> u64 {
        self.shared.press_count()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.is_paused()
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval()
    }

    /// Remaining run time; `None` while an unbounded run is active.
    pub fn remaining(&self) -> Option<Duration> {
        self.shared.remaining()
    }

    /// True once the loop task has finished (or no run was ever started).
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }
}

/// Clonable control handle over a [`KeepAwake`] timer, for use from signal
/// handlers, hotkey watchers, or other tasks.
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<Shared>,
}

impl TimerHandle {
    pub fn stop(&self) {
        self.shared.stop();
    }

    pub fn pause(&self) {
        self.shared.pause();
    }

    pub fn resume(&self) {
        self.shared.resume();
    }

    pub fn reset_timer(&self) {
        self.shared.reset_timer();
    }

    pub fn press_count(&self) -> u64 {
        self.shared.press_count()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.is_paused()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.shared.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded_shared(interval: Duration, run_time: Duration) -> Shared {
        Shared::new(&Config {
            interval,
            run_time: Some(run_time),
            ..Config::default()
        })
    }

    #[test]
    fn test_begin_arms_a_fresh_run() {
        let shared = bounded_shared(Duration::from_secs(1), Duration::from_secs(5));
        shared.press_count.store(7, Ordering::SeqCst);
        shared.terminate();

        shared.begin();
        assert!(shared.is_running());
        assert_eq!(shared.press_count(), 0);
        assert_eq!(shared.remaining(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_terminate_is_idempotent() {
        let shared = bounded_shared(Duration::from_secs(1), Duration::from_secs(5));
        shared.begin();
        shared.terminate();
        shared.terminate();
        assert!(!shared.is_running());
        assert_eq!(shared.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_consume_clamps_at_zero() {
        let shared = bounded_shared(Duration::from_secs(2), Duration::from_secs(3));
        shared.begin();
        shared.consume(Duration::from_secs(2));
        assert_eq!(shared.remaining(), Some(Duration::from_secs(1)));
        shared.consume(Duration::from_secs(2));
        assert_eq!(shared.remaining(), Some(Duration::ZERO));
        assert!(!shared.has_time_left());
    }

    #[test]
    fn test_consume_leaves_unbounded_untouched() {
        let shared = Shared::new(&Config::default());
        shared.begin();
        shared.consume(Duration::from_secs(210));
        assert_eq!(shared.remaining(), None);
        assert!(shared.has_time_left());
    }

    #[test]
    fn test_resume_rederives_remaining_from_press_count() {
        let shared = bounded_shared(Duration::from_secs(1), Duration::from_secs(10));
        shared.begin();
        shared.press_count.store(4, Ordering::SeqCst);
        shared.consume(Duration::from_secs(1));

        shared.pause();
        assert!(shared.is_paused());
        shared.resume();
        assert!(!shared.is_paused());
        // 10s run time minus 4 counted presses of 1s each.
        assert_eq!(shared.remaining(), Some(Duration::from_secs(6)));
    }

    #[test]
    fn test_resume_saturates_when_presses_exceed_run_time() {
        let shared = bounded_shared(Duration::from_secs(3), Duration::from_secs(5));
        shared.begin();
        shared.press_count.store(100, Ordering::SeqCst);
        shared.resume();
        assert_eq!(shared.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_reset_timer_restores_run_time_and_keeps_count() {
        let shared = bounded_shared(Duration::from_secs(1), Duration::from_secs(5));
        shared.begin();
        shared.press_count.store(3, Ordering::SeqCst);
        shared.consume(Duration::from_secs(3));

        shared.reset_timer();
        assert_eq!(shared.remaining(), Some(Duration::from_secs(5)));
        assert_eq!(shared.press_count(), 3);
    }
}
