use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use quiz_core::Clock;
use quiz_core::model::{Answers, AttemptRecord, OptionId, OptionStatus, Passage, QuestionId};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::engine::{SessionEngine, SessionStatus, Submission};
use crate::error::SessionError;
use crate::timer::{CountdownTimer, TimerListener, TimerPhase};

/// Observable state of a live session, published after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub remaining_secs: u32,
    pub timer_phase: TimerPhase,
    pub answers: Answers,
    pub answered: usize,
    pub total: usize,
    pub can_submit: bool,
    pub record: Option<AttemptRecord>,
}

impl SessionSnapshot {
    fn capture(engine: &SessionEngine, timer: &CountdownTimer) -> Self {
        let remaining_secs = timer.remaining_secs();
        Self {
            status: engine.status(),
            remaining_secs,
            timer_phase: TimerPhase::for_remaining(remaining_secs),
            answers: engine.answers().cloned().unwrap_or_default(),
            answered: engine.answered_count(),
            total: engine.total_questions(),
            can_submit: engine.can_submit(),
            record: engine.record().cloned(),
        }
    }
}

/// A running attempt: the session engine plus its countdown.
///
/// Cloning is cheap and every clone drives the same session. The countdown is
/// stopped when the session ends, when [`leave`](Self::leave) is called and
/// when the last handle is dropped.
#[derive(Clone)]
pub struct LiveSession {
    inner: Arc<LiveInner>,
}

struct LiveInner {
    passage: Arc<Passage>,
    engine: Mutex<SessionEngine>,
    timer: CountdownTimer,
    clock: Clock,
    /// Runtime instant the current attempt began; measures time spent.
    running_since: Mutex<Instant>,
    snapshot: watch::Sender<SessionSnapshot>,
}

struct TimeUpRelay {
    session: Weak<LiveInner>,
}

impl TimerListener for TimeUpRelay {
    fn on_tick(&self, _remaining_secs: u32) {
        if let Some(inner) = self.session.upgrade() {
            inner.publish(&inner.lock());
        }
    }

    fn on_time_up(&self) {
        if let Some(inner) = self.session.upgrade() {
            inner.expire();
        }
    }
}

impl LiveSession {
    /// Wrap an active engine and start its countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if `engine` has not been activated.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(engine: SessionEngine, clock: Clock) -> Result<Self, SessionError> {
        if engine.status() != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        let Some(passage) = engine.passage().cloned() else {
            return Err(SessionError::NotActive);
        };

        let inner = Arc::new_cyclic(|weak: &Weak<LiveInner>| {
            let relay: Arc<dyn TimerListener> = Arc::new(TimeUpRelay {
                session: weak.clone(),
            });
            let timer = CountdownTimer::new(relay);
            let snapshot = SessionSnapshot::capture(&engine, &timer);
            LiveInner {
                passage,
                engine: Mutex::new(engine),
                timer,
                clock,
                running_since: Mutex::new(Instant::now()),
                snapshot: watch::channel(snapshot).0,
            }
        });

        {
            let engine = inner.lock();
            inner.timer.start(inner.passage.time_limit_secs());
            inner.publish(&engine);
        }
        info!(
            passage_id = %inner.passage.id(),
            questions = inner.passage.questions().len(),
            time_limit_secs = inner.passage.time_limit_secs(),
            "session started"
        );
        Ok(Self { inner })
    }

    #[must_use]
    pub fn passage(&self) -> &Passage {
        &self.inner.passage
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receiver notified after every state change and every timer tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.lock().status()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.inner.lock().can_submit()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.inner.timer.remaining_secs()
    }

    #[must_use]
    pub fn selected(&self, question: &QuestionId) -> Option<OptionId> {
        self.inner.lock().selected(question).cloned()
    }

    #[must_use]
    pub fn option_status(&self, question: &QuestionId, option: &OptionId) -> OptionStatus {
        self.inner.lock().option_status(question, option)
    }

    /// Select an option. No-op unless active or for an unknown question.
    pub fn select_answer(&self, question: QuestionId, option: OptionId) {
        let mut engine = self.inner.lock();
        if engine.select_answer(question, option) {
            self.inner.publish(&engine);
        }
    }

    /// Submit on the user's behalf.
    ///
    /// Returns the existing record if the session has already ended.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Incomplete` while any question is unanswered.
    pub fn submit(&self) -> Result<AttemptRecord, SessionError> {
        let mut engine = self.inner.lock();
        if engine.status() == SessionStatus::Active && !engine.can_submit() {
            return Err(SessionError::Incomplete {
                answered: engine.answered_count(),
                total: engine.total_questions(),
            });
        }
        self.inner.finish(&mut engine, "manual")
    }

    /// Discard the current attempt and start over with a full countdown.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the engine.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut engine = self.inner.lock();
        engine.reset(self.inner.clock.now())?;
        *self.inner.running_since() = Instant::now();
        self.inner.timer.start(self.inner.passage.time_limit_secs());
        self.inner.publish(&engine);
        info!(passage_id = %self.inner.passage.id(), "session reset");
        Ok(())
    }

    /// Stop the countdown because the view went away.
    pub fn leave(&self) {
        self.inner.timer.stop();
        debug!(passage_id = %self.inner.passage.id(), "session left");
    }
}

impl PartialEq for LiveSession {
    /// Handles are equal when they drive the same session.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for LiveSession {}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("passage_id", self.inner.passage.id())
            .finish_non_exhaustive()
    }
}

impl LiveInner {
    fn lock(&self) -> MutexGuard<'_, SessionEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn running_since(&self) -> MutexGuard<'_, Instant> {
        self.running_since
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Wall-clock start plus elapsed runtime time, so a wall-clock jump during
    /// the attempt does not distort the time spent.
    fn completion_time(&self, engine: &SessionEngine) -> DateTime<Utc> {
        let elapsed = self.running_since().elapsed();
        match (engine.started_at(), chrono::Duration::from_std(elapsed)) {
            (Some(started_at), Ok(elapsed)) => started_at + elapsed,
            _ => self.clock.now(),
        }
    }

    fn publish(&self, engine: &SessionEngine) {
        self.snapshot
            .send_replace(SessionSnapshot::capture(engine, &self.timer));
    }

    fn finish(
        &self,
        engine: &mut SessionEngine,
        trigger: &'static str,
    ) -> Result<AttemptRecord, SessionError> {
        let submission = engine.submit(self.completion_time(engine))?;
        if let Submission::Finalized(record) = &submission {
            self.timer.stop();
            self.publish(engine);
            info!(
                passage_id = %record.passage_id(),
                score = record.score().value(),
                time_spent_secs = record.time_spent_secs(),
                trigger,
                "session submitted"
            );
        }
        Ok(submission.into_record())
    }

    fn expire(&self) {
        let mut engine = self.lock();
        if engine.status() != SessionStatus::Active {
            warn!(
                passage_id = %self.passage.id(),
                status = engine.status().as_str(),
                "late time-up ignored"
            );
            return;
        }
        if let Err(err) = self.finish(&mut engine, "time-up") {
            warn!(passage_id = %self.passage.id(), error = %err, "auto-submit failed");
        }
    }
}
