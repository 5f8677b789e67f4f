use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::sessions::AssessmentService;

/// Assembles app-facing services over one content repository.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    assessment: Arc<AssessmentService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&storage.passages))),
            assessment: Arc::new(AssessmentService::new(
                clock,
                Arc::clone(&storage.passages),
            )),
        }
    }

    /// Build services reading a static catalog directory.
    #[must_use]
    pub fn from_catalog_dir(root: impl Into<PathBuf>, clock: Clock) -> Self {
        let root = root.into();
        info!(root = %root.display(), "using static catalog");
        Self::new(&Storage::catalog(root), clock)
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        info!(db_url, "using sqlite catalog");
        Ok(Self::new(&storage, clock))
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn assessment(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessment)
    }
}
