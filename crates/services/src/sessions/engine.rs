use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerKey, Answers, AttemptRecord, OptionId, OptionStatus, Passage, PassageId, QuestionId,
};

use crate::error::SessionError;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle status of an assessment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Passage requested, question data not yet available.
    Loading,
    Active,
    /// Terminal. Only reached through submission.
    Ended,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

/// Outcome of [`SessionEngine::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// This call ended the session.
    Finalized(AttemptRecord),
    /// The session had already ended; the original record is returned unchanged.
    AlreadyEnded(AttemptRecord),
}

impl Submission {
    #[must_use]
    pub fn record(&self) -> &AttemptRecord {
        match self {
            Self::Finalized(record) | Self::AlreadyEnded(record) => record,
        }
    }

    #[must_use]
    pub fn into_record(self) -> AttemptRecord {
        match self {
            Self::Finalized(record) | Self::AlreadyEnded(record) => record,
        }
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        matches!(self, Self::Finalized(_))
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

enum Phase {
    Loading,
    Active {
        answers: Answers,
        started_at: DateTime<Utc>,
    },
    Ended {
        record: AttemptRecord,
    },
}

/// Validated question data shared by every phase after loading.
struct Loaded {
    passage: Arc<Passage>,
    key: AnswerKey,
}

/// State machine for a single assessment attempt.
///
/// Timestamps come from the caller so the engine stays deterministic; it never
/// reads the clock or touches the timer itself.
pub struct SessionEngine {
    passage_id: PassageId,
    loaded: Option<Loaded>,
    phase: Phase,
}

impl SessionEngine {
    /// Create an engine waiting for `passage_id` to load.
    #[must_use]
    pub fn new(passage_id: PassageId) -> Self {
        Self {
            passage_id,
            loaded: None,
            phase: Phase::Loading,
        }
    }

    /// Create an engine and activate it immediately.
    ///
    /// # Errors
    ///
    /// See [`activate`](Self::activate).
    pub fn start(passage: Passage, now: DateTime<Utc>) -> Result<Self, SessionError> {
        let mut engine = Self::new(passage.id().clone());
        engine.activate(passage, now)?;
        Ok(engine)
    }

    /// Move from `Loading` to `Active`, capturing `now` as the start time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoading` if the session has already started,
    /// `SessionError::PassageMismatch` if `passage` is not the requested one and
    /// `SessionError::Malformed` if the question set cannot be scored.
    pub fn activate(&mut self, passage: Passage, now: DateTime<Utc>) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Loading) {
            return Err(SessionError::NotLoading);
        }
        if passage.id() != &self.passage_id {
            return Err(SessionError::PassageMismatch {
                expected: self.passage_id.clone(),
                actual: passage.id().clone(),
            });
        }
        let key = passage.answer_key()?;
        self.loaded = Some(Loaded {
            passage: Arc::new(passage),
            key,
        });
        self.phase = Phase::Active {
            answers: Answers::new(),
            started_at: now,
        };
        Ok(())
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self.phase {
            Phase::Loading => SessionStatus::Loading,
            Phase::Active { .. } => SessionStatus::Active,
            Phase::Ended { .. } => SessionStatus::Ended,
        }
    }

    #[must_use]
    pub fn passage_id(&self) -> &PassageId {
        &self.passage_id
    }

    #[must_use]
    pub fn passage(&self) -> Option<&Arc<Passage>> {
        self.loaded.as_ref().map(|loaded| &loaded.passage)
    }

    /// Current selections while active, the finalized ones once ended.
    #[must_use]
    pub fn answers(&self) -> Option<&Answers> {
        match &self.phase {
            Phase::Loading => None,
            Phase::Active { answers, .. } => Some(answers),
            Phase::Ended { record } => Some(record.answers()),
        }
    }

    #[must_use]
    pub fn selected(&self, question: &QuestionId) -> Option<&OptionId> {
        self.answers().and_then(|answers| answers.get(question))
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::Active { started_at, .. } => Some(started_at),
            _ => None,
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<&AttemptRecord> {
        match &self.phase {
            Phase::Ended { record } => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.loaded.as_ref().map_or(0, |loaded| loaded.key.total())
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        match (&self.loaded, self.answers()) {
            (Some(loaded), Some(answers)) => loaded.key.answered_count(answers),
            _ => 0,
        }
    }

    /// Record `option` for `question`, replacing any earlier choice.
    ///
    /// Ignored unless the session is active or when the question is not part
    /// of the passage. The option id is not checked. Returns whether the
    /// selection was stored.
    pub fn select_answer(&mut self, question: QuestionId, option: OptionId) -> bool {
        let (Some(loaded), Phase::Active { answers, .. }) = (&self.loaded, &mut self.phase) else {
            return false;
        };
        if !loaded.key.contains_question(&question) {
            return false;
        }
        answers.insert(question, option);
        true
    }

    /// True iff the session is active and every question has a selection.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        match (&self.loaded, &self.phase) {
            (Some(loaded), Phase::Active { answers, .. }) => loaded.key.is_complete(answers),
            _ => false,
        }
    }

    /// End the session and produce the attempt record.
    ///
    /// Does not check [`can_submit`](Self::can_submit); manual callers gate on
    /// it, timer expiry does not. A second call returns the original record as
    /// [`Submission::AlreadyEnded`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` while loading.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<Submission, SessionError> {
        let Some(loaded) = &self.loaded else {
            return Err(SessionError::NotActive);
        };
        let record = match &mut self.phase {
            Phase::Loading => return Err(SessionError::NotActive),
            Phase::Ended { record } => return Ok(Submission::AlreadyEnded(record.clone())),
            Phase::Active {
                answers,
                started_at,
            } => AttemptRecord::finalize(
                self.passage_id.clone(),
                &loaded.key,
                std::mem::take(answers),
                *started_at,
                now,
            )?,
        };
        self.phase = Phase::Ended {
            record: record.clone(),
        };
        Ok(Submission::Finalized(record))
    }

    /// Start over on the same passage with no answers and a fresh start time.
    ///
    /// Any earlier record is dropped from the engine; copies already handed
    /// out are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` while loading.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.loaded.is_none() {
            return Err(SessionError::NotActive);
        }
        self.phase = Phase::Active {
            answers: Answers::new(),
            started_at: now,
        };
        Ok(())
    }

    /// Display status of one option.
    ///
    /// Always `Default` before the session ends.
    #[must_use]
    pub fn option_status(&self, question: &QuestionId, option: &OptionId) -> OptionStatus {
        match (&self.loaded, &self.phase) {
            (Some(loaded), Phase::Ended { record }) => {
                loaded.key.final_status(record.answers(), question, option)
            }
            _ => OptionStatus::Default,
        }
    }
}
