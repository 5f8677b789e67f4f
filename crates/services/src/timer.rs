//! Countdown timer driving time-based auto-submission.
//!
//! [`Countdown`] is the pure state machine; [`CountdownTimer`] wraps it in a
//! single spawned tick task and reports to a [`TimerListener`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Remaining time at or below which the timer is in the warning phase.
pub const WARNING_THRESHOLD_SECS: u32 = 5 * 60;
/// Remaining time at or below which the timer is in the critical phase.
pub const CRITICAL_THRESHOLD_SECS: u32 = 60;

const TICK_PERIOD: Duration = Duration::from_secs(1);

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Presentation phase derived from the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Normal,
    Warning,
    Critical,
}

impl TimerPhase {
    #[must_use]
    pub fn for_remaining(remaining_secs: u32) -> Self {
        if remaining_secs <= CRITICAL_THRESHOLD_SECS {
            Self::Critical
        } else if remaining_secs <= WARNING_THRESHOLD_SECS {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// Result of feeding one tick into a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The tick came from a superseded run or the countdown is not running.
    Ignored,
    Remaining(u32),
    /// Remaining time reached zero; the countdown has stopped.
    TimeUp,
}

/// Pure countdown state.
///
/// Every `start`, `pause`, `resume` and `stop` bumps the generation, so ticks
/// scheduled by an earlier run are recognised as stale and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
    fired: bool,
    generation: u64,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to `duration_secs` and start running. Returns the new generation.
    pub fn start(&mut self, duration_secs: u32) -> u64 {
        self.remaining = duration_secs;
        self.running = true;
        self.fired = false;
        self.bump()
    }

    /// Stop ticking without touching the remaining time.
    ///
    /// Returns `true` if the countdown was running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.bump();
        true
    }

    /// Continue a paused countdown. Returns the new generation, or `None` when
    /// there is nothing to resume.
    pub fn resume(&mut self) -> Option<u64> {
        if self.running || self.fired || self.remaining == 0 {
            return None;
        }
        self.running = true;
        Some(self.bump())
    }

    /// Stop ticking and invalidate any outstanding ticks.
    pub fn stop(&mut self) {
        self.running = false;
        self.bump();
    }

    /// Apply one elapsed second for `generation`.
    pub fn tick(&mut self, generation: u64) -> Tick {
        if !self.running || generation != self.generation {
            return Tick::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Tick::Remaining(self.remaining);
        }
        self.running = false;
        self.fired = true;
        self.bump();
        Tick::TimeUp
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        TimerPhase::for_remaining(self.remaining)
    }

    fn bump(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

//
// ─── TIMER ─────────────────────────────────────────────────────────────────────
//

/// Receives timer events. Called from the tick task, never with timer locks held.
pub trait TimerListener: Send + Sync {
    fn on_tick(&self, remaining_secs: u32);
    fn on_time_up(&self);
}

/// Countdown driven by one `tokio` interval task.
///
/// At most one tick task exists at a time: starting or resuming aborts the
/// previous task before spawning a new one, and dropping the timer aborts it.
pub struct CountdownTimer {
    inner: Arc<TimerInner>,
}

struct TimerInner {
    state: Mutex<TimerState>,
    listener: Arc<dyn TimerListener>,
}

#[derive(Default)]
struct TimerState {
    countdown: Countdown,
    task: Option<JoinHandle<()>>,
}

impl TimerState {
    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl CountdownTimer {
    #[must_use]
    pub fn new(listener: Arc<dyn TimerListener>) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                state: Mutex::new(TimerState::default()),
                listener,
            }),
        }
    }

    /// Reset to `duration_secs` and begin ticking.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self, duration_secs: u32) {
        let mut state = self.inner.lock();
        state.abort_task();
        let generation = state.countdown.start(duration_secs);
        state.task = Some(self.spawn(generation));
        debug!(duration_secs, generation, "timer started");
    }

    /// Stop ticking, keeping the remaining time.
    pub fn pause(&self) {
        let mut state = self.inner.lock();
        if state.countdown.pause() {
            state.abort_task();
            debug!(remaining_secs = state.countdown.remaining_secs(), "timer paused");
        }
    }

    /// Continue after [`pause`](Self::pause).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn resume(&self) {
        let mut state = self.inner.lock();
        if let Some(generation) = state.countdown.resume() {
            state.abort_task();
            state.task = Some(self.spawn(generation));
            debug!(remaining_secs = state.countdown.remaining_secs(), "timer resumed");
        }
    }

    /// Stop ticking for good. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut state = self.inner.lock();
        state.countdown.stop();
        if state.task.is_some() {
            state.abort_task();
            debug!(remaining_secs = state.countdown.remaining_secs(), "timer stopped");
        }
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.inner.lock().countdown.remaining_secs()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.lock().countdown.is_running()
    }

    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        self.inner.lock().countdown.phase()
    }

    fn spawn(&self, generation: u64) -> JoinHandle<()> {
        tokio::spawn(run_ticks(Arc::downgrade(&self.inner), generation))
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.inner.lock().abort_task();
    }
}

impl TimerInner {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_ticks(inner: Weak<TimerInner>, generation: u64) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        interval.tick().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let tick = inner.lock().countdown.tick(generation);
        match tick {
            Tick::Ignored => return,
            Tick::Remaining(remaining) => inner.listener.on_tick(remaining),
            Tick::TimeUp => {
                debug!(generation, "timer reached zero");
                inner.listener.on_time_up();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn phases_follow_thresholds() {
        assert_eq!(TimerPhase::for_remaining(301), TimerPhase::Normal);
        assert_eq!(TimerPhase::for_remaining(300), TimerPhase::Warning);
        assert_eq!(TimerPhase::for_remaining(61), TimerPhase::Warning);
        assert_eq!(TimerPhase::for_remaining(60), TimerPhase::Critical);
        assert_eq!(TimerPhase::for_remaining(0), TimerPhase::Critical);
    }

    #[test]
    fn countdown_fires_once_after_sixty_ticks_per_minute() {
        let mut countdown = Countdown::new();
        let generation = countdown.start(2 * 60);

        let mut time_ups = 0;
        for _ in 0..2 * 60 {
            if countdown.tick(generation) == Tick::TimeUp {
                time_ups += 1;
            }
        }
        assert_eq!(time_ups, 1);
        assert_eq!(countdown.remaining_secs(), 0);
        assert!(!countdown.is_running());
        assert_eq!(countdown.tick(generation), Tick::Ignored);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut countdown = Countdown::new();
        let old = countdown.start(10);
        let new = countdown.start(10);
        assert_eq!(countdown.tick(old), Tick::Ignored);
        assert_eq!(countdown.tick(new), Tick::Remaining(9));
    }

    #[test]
    fn pause_and_resume_keep_remaining_time() {
        let mut countdown = Countdown::new();
        let generation = countdown.start(10);
        countdown.tick(generation);
        countdown.tick(generation);

        assert!(countdown.pause());
        assert!(!countdown.pause());
        assert_eq!(countdown.tick(generation), Tick::Ignored);
        assert_eq!(countdown.remaining_secs(), 8);

        let resumed = countdown.resume().expect("paused countdown resumes");
        assert_eq!(countdown.tick(resumed), Tick::Remaining(7));
    }

    #[test]
    fn resume_after_time_up_is_refused() {
        let mut countdown = Countdown::new();
        let generation = countdown.start(1);
        assert_eq!(countdown.tick(generation), Tick::TimeUp);
        assert_eq!(countdown.tick(generation), Tick::Ignored);
        assert!(countdown.resume().is_none());
    }

    #[derive(Default)]
    struct Recorder {
        ticks: Mutex<Vec<u32>>,
        time_ups: AtomicUsize,
    }

    impl TimerListener for Recorder {
        fn on_tick(&self, remaining_secs: u32) {
            self.ticks.lock().unwrap().push(remaining_secs);
        }

        fn on_time_up(&self) {
            self.time_ups.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn timer() -> (CountdownTimer, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn TimerListener> = recorder.clone();
        (CountdownTimer::new(listener), recorder)
    }

    async fn wait(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn one_minute_timer_fires_time_up_once() {
        let (timer, recorder) = timer();
        timer.start(60);
        assert_eq!(timer.remaining_secs(), 60);

        wait(60_500).await;
        assert_eq!(recorder.time_ups.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_secs(), 0);
        assert!(!timer.is_running());
        assert_eq!(recorder.ticks.lock().unwrap().len(), 59);

        wait(5_000).await;
        assert_eq!(recorder.time_ups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_resume_preserves_remaining() {
        let (timer, _recorder) = timer();
        timer.start(10);
        wait(3_500).await;
        assert_eq!(timer.remaining_secs(), 7);

        timer.pause();
        wait(10_000).await;
        assert_eq!(timer.remaining_secs(), 7);
        assert!(!timer.is_running());

        timer.resume();
        wait(2_500).await;
        assert_eq!(timer.remaining_secs(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_tick_source() {
        let (timer, _recorder) = timer();
        timer.start(100);
        wait(2_500).await;
        assert_eq!(timer.remaining_secs(), 98);

        timer.start(100);
        wait(3_200).await;
        assert_eq!(timer.remaining_secs(), 97);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_timer_never_fires() {
        let (timer, recorder) = timer();
        timer.start(2);
        timer.stop();
        timer.stop();
        wait(5_000).await;
        assert_eq!(recorder.time_ups.load(Ordering::SeqCst), 0);
        assert_eq!(timer.remaining_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_cancels_ticks() {
        let (timer, recorder) = timer();
        timer.start(2);
        drop(timer);
        wait(5_000).await;
        assert_eq!(recorder.time_ups.load(Ordering::SeqCst), 0);
        assert!(recorder.ticks.lock().unwrap().is_empty());
    }
}
