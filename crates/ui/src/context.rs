use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::model::{AttemptRecord, Passage};
use services::{AppServices, AssessmentService, CatalogService};

pub trait UiApp: Send + Sync {
    fn catalog(&self) -> Arc<CatalogService>;
    fn assessment(&self) -> Arc<AssessmentService>;
}

impl UiApp for AppServices {
    fn catalog(&self) -> Arc<CatalogService> {
        AppServices::catalog(self)
    }

    fn assessment(&self) -> Arc<AssessmentService> {
        AppServices::assessment(self)
    }
}

/// A finished attempt on its way from the question view to the results view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedAttempt {
    pub passage: Passage,
    pub record: AttemptRecord,
}

/// Single-slot, take-once transfer of a finished attempt between views.
#[derive(Clone, Default)]
pub struct AttemptHandoff {
    slot: Arc<Mutex<Option<CompletedAttempt>>>,
}

impl AttemptHandoff {
    /// Place an attempt in the slot, replacing one nobody picked up.
    pub fn put(&self, attempt: CompletedAttempt) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(attempt);
    }

    /// Take the attempt out. Later calls see `None` until the next `put`.
    #[must_use]
    pub fn take(&self) -> Option<CompletedAttempt> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[derive(Clone)]
pub struct AppContext {
    catalog: Arc<CatalogService>,
    assessment: Arc<AssessmentService>,
    handoff: AttemptHandoff,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            catalog: app.catalog(),
            assessment: app.assessment(),
            handoff: AttemptHandoff::default(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn assessment(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessment)
    }

    #[must_use]
    pub fn handoff(&self) -> AttemptHandoff {
        self.handoff.clone()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, Answers, Difficulty, OptionId, PassageId, Question, QuestionId};
    use quiz_core::time::fixed_now;

    fn attempt() -> CompletedAttempt {
        let passage = Passage::new(
            PassageId::new("p"),
            "Title",
            "Body",
            1,
            Difficulty::Easy,
            1,
            fixed_now(),
            vec![Question::new(
                QuestionId::new("q1"),
                "Q",
                vec![AnswerOption::new(OptionId::new("a"), "A", true)],
            )],
        )
        .unwrap();
        let record = AttemptRecord::finalize(
            passage.id().clone(),
            &passage.answer_key().unwrap(),
            Answers::new(),
            fixed_now(),
            fixed_now(),
        )
        .unwrap();
        CompletedAttempt { passage, record }
    }

    #[test]
    fn handoff_is_taken_once() {
        let handoff = AttemptHandoff::default();
        assert!(handoff.take().is_none());

        handoff.put(attempt());
        let shared = handoff.clone();
        assert_eq!(shared.take().map(|a| a.record.score().value()), Some(0));
        assert!(handoff.take().is_none());
    }
}
