use async_trait::async_trait;
use quiz_core::model::{Passage, PassageId};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Read-only content contract consumed by the session engine.
#[async_trait]
pub trait PassageRepository: Send + Sync {
    /// Fetch a fully resolved passage by ID.
    ///
    /// Returns `Ok(None)` when no passage has that ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn get_passage(&self, id: &PassageId) -> Result<Option<Passage>, StorageError>;

    /// List every passage in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn list_passages(&self) -> Result<Vec<Passage>, StorageError>;
}

/// Write side used by importers and tests.
#[async_trait]
pub trait PassageWriter: Send + Sync {
    /// Persist or replace a passage and its question set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the passage cannot be stored.
    async fn upsert_passage(&self, passage: &Passage) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    passages: Arc<Mutex<Vec<Passage>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            passages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_passages(passages: Vec<Passage>) -> Self {
        Self {
            passages: Arc::new(Mutex::new(passages)),
        }
    }
}

#[async_trait]
impl PassageRepository for InMemoryRepository {
    async fn get_passage(&self, id: &PassageId) -> Result<Option<Passage>, StorageError> {
        let guard = self
            .passages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|passage| passage.id() == id).cloned())
    }

    async fn list_passages(&self) -> Result<Vec<Passage>, StorageError> {
        let guard = self
            .passages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl PassageWriter for InMemoryRepository {
    async fn upsert_passage(&self, passage: &Passage) -> Result<(), StorageError> {
        let mut guard = self
            .passages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|existing| existing.id() == passage.id()) {
            Some(existing) => *existing = passage.clone(),
            None => guard.push(passage.clone()),
        }
        Ok(())
    }
}

/// Bundles the content repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub passages: Arc<dyn PassageRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_repository(repo: impl PassageRepository + 'static) -> Self {
        let passages: Arc<dyn PassageRepository> = Arc::new(repo);
        Self { passages }
    }
}
