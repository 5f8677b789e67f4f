use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{Passage, PassageId};
use tracing::{debug, warn};

use crate::record::{CatalogFile, PassageRecord};
use crate::repository::{PassageRepository, PassageWriter, Storage, StorageError};

/// Read-only repository over a static catalog directory.
///
/// The directory holds an index file (`essays.json` by default) and, optionally,
/// plain-text bodies referenced from the index through `contentFile`. The index
/// is re-read on every call so edits show up without a restart.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    root: PathBuf,
    index_file: String,
}

impl CatalogRepository {
    pub const DEFAULT_INDEX: &'static str = "essays.json";

    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: Self::DEFAULT_INDEX.to_owned(),
        }
    }

    #[must_use]
    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and parse the index file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read and
    /// `StorageError::Serialization` if it is not a valid catalog.
    pub async fn read_index(&self) -> Result<CatalogFile, StorageError> {
        let path = self.root.join(&self.index_file);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {e}", path.display())))?;
        let catalog: CatalogFile =
            serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        debug!(path = %path.display(), passages = catalog.essays.len(), "catalog index loaded");
        Ok(catalog)
    }

    /// Replace the inline body with the referenced content file, if any.
    ///
    /// A body that cannot be read is logged and the inline content is kept.
    async fn resolve(&self, mut record: PassageRecord) -> PassageRecord {
        let Some(file) = record.content_file.clone() else {
            return record;
        };
        match self.read_content_file(&file).await {
            Ok(text) => record.content = Some(text),
            Err(err) => {
                warn!(passage_id = %record.id, content_file = %file, error = %err, "failed to load passage content");
            }
        }
        record
    }

    async fn read_content_file(&self, relative: &str) -> Result<String, StorageError> {
        let relative = Path::new(relative);
        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(StorageError::Io(format!(
                "content file must stay inside the catalog: {}",
                relative.display()
            )));
        }
        let path = self.root.join(relative);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl PassageRepository for CatalogRepository {
    async fn get_passage(&self, id: &PassageId) -> Result<Option<Passage>, StorageError> {
        let catalog = self.read_index().await?;
        let Some(record) = catalog
            .essays
            .into_iter()
            .find(|record| record.id == id.as_str())
        else {
            return Ok(None);
        };
        self.resolve(record).await.into_passage().map(Some)
    }

    async fn list_passages(&self) -> Result<Vec<Passage>, StorageError> {
        let catalog = self.read_index().await?;
        let mut passages = Vec::with_capacity(catalog.essays.len());
        for record in catalog.essays {
            let id = record.id.clone();
            match self.resolve(record).await.into_passage() {
                Ok(passage) => passages.push(passage),
                Err(err) => warn!(passage_id = %id, error = %err, "skipping invalid catalog entry"),
            }
        }
        Ok(passages)
    }
}

/// Copy every assessable passage from `source` into `target`, keeping catalog order.
///
/// Passages whose question set fails [`Passage::answer_key`] are skipped with a
/// warning. Returns the number of passages written.
///
/// # Errors
///
/// Returns `StorageError` if the source cannot be listed or a write fails.
pub async fn import_passages(
    source: &dyn PassageRepository,
    target: &dyn PassageWriter,
) -> Result<usize, StorageError> {
    let passages = source.list_passages().await?;
    let mut imported = 0;
    for passage in &passages {
        if let Err(err) = passage.answer_key() {
            warn!(passage_id = %passage.id(), error = %err, "skipping passage with invalid questions");
            continue;
        }
        target.upsert_passage(passage).await?;
        imported += 1;
        debug!(passage_id = %passage.id(), "passage imported");
    }
    Ok(imported)
}

impl Storage {
    /// Build a `Storage` reading from a static catalog directory.
    #[must_use]
    pub fn catalog(root: impl Into<PathBuf>) -> Self {
        let passages: Arc<dyn PassageRepository> = Arc::new(CatalogRepository::new(root));
        Self { passages }
    }
}
