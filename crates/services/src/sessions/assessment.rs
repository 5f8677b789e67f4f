use std::sync::Arc;

use quiz_core::model::PassageId;
use storage::repository::PassageRepository;
use tracing::debug;

use super::engine::SessionEngine;
use super::live::LiveSession;
use crate::Clock;
use crate::error::SessionError;

/// Opens assessment sessions against the content repository.
#[derive(Clone)]
pub struct AssessmentService {
    clock: Clock,
    passages: Arc<dyn PassageRepository>,
}

impl AssessmentService {
    #[must_use]
    pub fn new(clock: Clock, passages: Arc<dyn PassageRepository>) -> Self {
        Self { clock, passages }
    }

    /// Fetch a passage, validate it and start a live session with its timer running.
    ///
    /// The engine stays in `Loading` while the fetch is pending. Failed fetches
    /// are not retried.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` when the repository has no such passage,
    /// `SessionError::Malformed` when its question set cannot be scored and
    /// `SessionError::Storage` when the fetch fails.
    pub async fn open(&self, passage_id: &PassageId) -> Result<LiveSession, SessionError> {
        let mut engine = SessionEngine::new(passage_id.clone());
        debug!(passage_id = %passage_id, status = engine.status().as_str(), "fetching passage");

        let passage = self
            .passages
            .get_passage(passage_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(passage_id.clone()))?;
        engine.activate(passage, self.clock.now())?;
        LiveSession::start(engine, self.clock)
    }
}
