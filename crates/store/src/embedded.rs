use async_trait::async_trait;
use chrono::Utc;
use site_wizard_core::{Error, Page, Project, ProjectInput, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::{ProjectStore, new_project_id};

enum Backing {
    Memory(Mutex<Vec<Project>>),
    File { path: PathBuf, lock: Mutex<()> },
}

/// Store keeping each project as one record with its pages embedded.
///
/// Every write replaces the whole collection, so a save is either fully
/// visible or not at all. New projects go to the front.
pub struct EmbeddedStore {
    backing: Backing,
}

impl EmbeddedStore {
    pub fn in_memory() -> Self {
        Self {
            backing: Backing::Memory(Mutex::new(Vec::new())),
        }
    }

    /// JSON file backing. The file is read on every access and created on
    /// first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            backing: Backing::File {
                path: path.into(),
                lock: Mutex::new(()),
            },
        }
    }

    async fn snapshot(&self) -> Result<Vec<Project>> {
        match &self.backing {
            Backing::Memory(projects) => Ok(projects.lock().await.clone()),
            Backing::File { path, lock } => {
                let _guard = lock.lock().await;
                read_projects(path).await
            }
        }
    }

    /// Read-modify-write under the backing's lock
    async fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Project>) -> Result<T> + Send,
        T: Send,
    {
        match &self.backing {
            Backing::Memory(projects) => {
                let mut guard = projects.lock().await;
                f(&mut guard)
            }
            Backing::File { path, lock } => {
                let _guard = lock.lock().await;
                let mut projects = read_projects(path).await?;
                let out = f(&mut projects)?;
                write_projects(path, &projects).await?;
                Ok(out)
            }
        }
    }
}

#[async_trait]
impl ProjectStore for EmbeddedStore {
    async fn save(&self, input: ProjectInput) -> Result<Project> {
        let project = input.into_project(new_project_id(), Utc::now());
        let saved = project.clone();
        self.modify(move |projects| {
            projects.insert(0, project);
            Ok(())
        })
        .await?;

        tracing::info!(id = %saved.id, title = %saved.title, "Project saved");
        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let mut projects = self.snapshot().await?;
        // stable: equal timestamps keep storage order, newest insert first
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    async fn get(&self, id: &str) -> Result<Option<Project>> {
        let projects = self.snapshot().await?;
        Ok(projects.into_iter().find(|p| p.id == id).map(|mut p| {
            p.structure = None;
            p
        }))
    }

    async fn update(&self, id: &str, input: ProjectInput) -> Result<Project> {
        let id = id.to_string();
        self.modify(move |projects| {
            let existing = projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| Error::NotFound(id.clone()))?;

            let mut updated = input.into_project(id.clone(), Utc::now());
            updated.created_at = existing.created_at;
            *existing = updated.clone();
            Ok(updated)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let removed = self
            .modify(|projects| {
                let before = projects.len();
                projects.retain(|p| p.id != id);
                Ok(before - projects.len())
            })
            .await?;

        tracing::debug!(id, removed, "Project delete");
        Ok(())
    }

    async fn structure(&self, id: &str) -> Result<Option<Vec<Page>>> {
        let projects = self.snapshot().await?;
        Ok(projects
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.structure.unwrap_or_default()))
    }

    async fn clear(&self) -> Result<()> {
        self.modify(|projects| {
            projects.clear();
            Ok(())
        })
        .await
    }
}

async fn read_projects(path: &Path) -> Result<Vec<Project>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(persistence_error("read", path, e)),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str(&raw) {
        Ok(projects) => Ok(projects),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to parse stored projects. Resetting storage."
            );
            if let Err(e) = fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove corrupt store");
            }
            Ok(Vec::new())
        }
    }
}

async fn write_projects(path: &Path, projects: &[Project]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| persistence_error("create directory for", path, e))?;
    }

    let json = serde_json::to_string_pretty(projects)
        .map_err(|e| Error::PersistenceFailed(format!("Failed to serialize projects: {}", e)))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .await
        .map_err(|e| persistence_error("write", &tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| persistence_error("replace", path, e))?;
    Ok(())
}

fn persistence_error(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::PersistenceFailed(format!("Failed to {} {}: {}", action, path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use site_wizard_core::{GeneratedContent, Section};
    use tempfile::TempDir;

    fn draft(title: &str) -> GeneratedContent {
        let section = |kind: &str, n: i64| Section {
            kind: kind.to_string(),
            content: json!({"n": n}).as_object().cloned().unwrap(),
        };
        GeneratedContent {
            title: title.to_string(),
            description: "desc".to_string(),
            theme: "theme".to_string(),
            pages: vec![
                Page {
                    name: "home".to_string(),
                    title: "Home".to_string(),
                    sections: vec![section("hero", 1), section("about", 2)],
                },
                Page {
                    name: String::new(),
                    title: "Contact".to_string(),
                    sections: vec![section("contact", 3)],
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_round_trip_keeps_order_and_content() {
        let store = EmbeddedStore::in_memory();
        let original = draft("Studio");
        let project = store.save(ProjectInput::from_draft(&original)).await.unwrap();

        let structure = store.structure(&project.id).await.unwrap().unwrap();
        let restored = GeneratedContent::from_project(&project, structure);

        assert_eq!(restored.pages.len(), 2);
        assert_eq!(restored.pages[1].name, "page-2");
        for (a, b) in original.pages.iter().zip(&restored.pages) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.sections, b.sections);
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = EmbeddedStore::in_memory();
        let a = store.save(ProjectInput::from_draft(&draft("A"))).await.unwrap();
        let b = store.save(ProjectInput::from_draft(&draft("B"))).await.unwrap();
        let c = store.save(ProjectInput::from_draft(&draft("C"))).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = EmbeddedStore::in_memory();
        let project = store.save(ProjectInput::default()).await.unwrap();

        store.delete("no-such-id").await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        store.delete(&project.id).await.unwrap();
        store.delete(&project.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp_and_keeps_identity() {
        let store = EmbeddedStore::in_memory();
        let project = store.save(ProjectInput::from_draft(&draft("Old"))).await.unwrap();

        let updated = store
            .update(&project.id, ProjectInput::from_draft(&draft("New")))
            .await
            .unwrap();
        assert_eq!(updated.id, project.id);
        assert_eq!(updated.title, "New");
        assert_eq!(updated.created_at, project.created_at);
        assert!(updated.updated_at >= project.updated_at);

        let err = store.update("missing", ProjectInput::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_structure_of_unknown_project() {
        let store = EmbeddedStore::in_memory();
        assert!(store.structure("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = EmbeddedStore::in_memory();
        store.save(ProjectInput::from_draft(&draft("A"))).await.unwrap();
        let b = store.save(ProjectInput::from_draft(&draft("B"))).await.unwrap();

        let found = store.get(&b.id).await.unwrap().unwrap();
        assert_eq!(found.title, "B");
        assert!(found.structure.is_none());
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_backing_persists_across_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("projects.json");

        let project = EmbeddedStore::open(&path)
            .save(ProjectInput::from_draft(&draft("Kept")))
            .await
            .unwrap();

        let reopened = EmbeddedStore::open(&path);
        let listed = reopened.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], project);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = EmbeddedStore::open(&path);
        assert!(store.list().await.unwrap().is_empty());
        assert!(!path.exists());

        store.save(ProjectInput::default()).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = EmbeddedStore::open(dir.path().join("projects.json"));
        store.save(ProjectInput::default()).await.unwrap();
        store.save(ProjectInput::default()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
