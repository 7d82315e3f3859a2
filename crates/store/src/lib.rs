// Project persistence: embedded documents or normalized SQLite rows

pub mod embedded;
pub mod normalized;

use async_trait::async_trait;
use site_wizard_core::config::StorageConfig;
use site_wizard_core::{Page, Project, ProjectInput, Result, StorageBackend};

pub use embedded::EmbeddedStore;
pub use normalized::NormalizedStore;

/// Storage contract shared by both record shapes.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Assign id and timestamps, apply defaults, persist.
    async fn save(&self, input: ProjectInput) -> Result<Project>;

    /// All projects, most recently updated first.
    async fn list(&self) -> Result<Vec<Project>>;

    /// One project by id, without its pages.
    async fn get(&self, id: &str) -> Result<Option<Project>>;

    /// Replace a project's content, keeping its id and creation time.
    async fn update(&self, id: &str, input: ProjectInput) -> Result<Project>;

    /// Remove a project. Unknown ids are not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Pages of a project in saved order, or `None` if the id is unknown.
    async fn structure(&self, id: &str) -> Result<Option<Vec<Page>>>;

    async fn clear(&self) -> Result<()>;
}

/// Open the store selected by configuration.
pub async fn open_store(config: &StorageConfig) -> Result<Box<dyn ProjectStore>> {
    match config.backend {
        StorageBackend::Embedded => {
            let path = config.resolved_path();
            tracing::debug!(path = %path.display(), "Opening embedded store");
            Ok(Box::new(EmbeddedStore::open(path)))
        }
        StorageBackend::Normalized => {
            let url = config.resolved_database_url();
            tracing::debug!(url = %url, atomic = config.atomic_writes, "Opening normalized store");
            let store = NormalizedStore::connect(&url).await?;
            Ok(Box::new(store.atomic(config.atomic_writes)))
        }
    }
}

pub(crate) fn new_project_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
