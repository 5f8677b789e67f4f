#![forbid(unsafe_code)]

pub mod catalog;
pub mod record;
pub mod repository;
pub mod sqlite;

pub use catalog::CatalogRepository;
pub use repository::{InMemoryRepository, PassageRepository, PassageWriter, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteRepository};
