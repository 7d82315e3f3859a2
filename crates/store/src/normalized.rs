use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_wizard_core::{
    Error, Page, PageRecord, Project, ProjectInput, Result, Section, SectionContent,
    SectionRecord,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use crate::{ProjectStore, new_project_id};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        user_id TEXT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        theme TEXT NOT NULL,
        primary_color TEXT NOT NULL,
        secondary_color TEXT NOT NULL,
        background_color TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id TEXT NOT NULL REFERENCES projects(id),
        name TEXT NOT NULL,
        title TEXT NOT NULL,
        "order" INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        page_id INTEGER NOT NULL REFERENCES pages(id),
        type TEXT NOT NULL,
        content TEXT NOT NULL,
        "order" INTEGER NOT NULL
    )"#,
];

type WriteFuture<'c> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'c>>;

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    user_id: Option<String>,
    title: String,
    description: String,
    theme: String,
    primary_color: String,
    secondary_color: String,
    background_color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            theme: row.theme,
            primary_color: row.primary_color,
            secondary_color: row.secondary_color,
            background_color: row.background_color,
            created_at: row.created_at,
            updated_at: row.updated_at,
            structure: None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PageRow {
    id: i64,
    project_id: String,
    name: String,
    title: String,
    order: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SectionRow {
    id: i64,
    page_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    content: String,
    order: i64,
}

/// Store splitting projects, pages and sections into linked rows.
///
/// Rows are inserted project first, then each page followed by its
/// sections, in draft order, with `order` set to the array index. By
/// default the inserts are not wrapped in a transaction: the first failing
/// insert is reported and rows written before it stay. With
/// [`NormalizedStore::atomic`] the whole sequence commits or rolls back
/// as one.
pub struct NormalizedStore {
    pool: SqlitePool,
    atomic: bool,
}

impl NormalizedStore {
    /// Connect to a SQLite URL, creating the database and schema if needed.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        // one long-lived connection, so `sqlite::memory:` keeps its data
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let store = Self {
            pool,
            atomic: false,
        };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }

    /// Page rows of a project, by `order`
    pub async fn pages(&self, project_id: &str) -> Result<Vec<PageRecord>> {
        let rows: Vec<PageRow> = sqlx::query_as(
            r#"SELECT id, project_id, name, title, "order" FROM pages
               WHERE project_id = ? ORDER BY "order""#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| PageRecord {
                id: row.id,
                project_id: row.project_id,
                name: row.name,
                title: row.title,
                order: row.order,
            })
            .collect())
    }

    /// Section rows of a page, by `order`
    pub async fn sections(&self, page_id: i64) -> Result<Vec<SectionRecord>> {
        let rows: Vec<SectionRow> = sqlx::query_as(
            r#"SELECT id, page_id, type, content, "order" FROM sections
               WHERE page_id = ? ORDER BY "order""#,
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                let content: SectionContent = serde_json::from_str(&row.content).map_err(|e| {
                    Error::PersistenceFailed(format!(
                        "Section {} has unreadable content: {}",
                        row.id, e
                    ))
                })?;
                Ok(SectionRecord {
                    id: row.id,
                    page_id: row.page_id,
                    kind: row.kind,
                    content,
                    order: row.order,
                })
            })
            .collect()
    }

    /// Run `write` on one connection, inside a transaction when `atomic`.
    async fn write<F>(&self, atomic: bool, write: F) -> Result<()>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> WriteFuture<'c> + Send,
    {
        if atomic {
            let mut tx = self.pool.begin().await.map_err(db_error)?;
            write(&mut *tx).await?;
            tx.commit().await.map_err(db_error)
        } else {
            let mut conn = self.pool.acquire().await.map_err(db_error)?;
            write(&mut *conn).await
        }
    }
}

#[async_trait]
impl ProjectStore for NormalizedStore {
    async fn save(&self, input: ProjectInput) -> Result<Project> {
        let mut project = input.into_project(new_project_id(), Utc::now());
        let pages = project.structure.take().unwrap_or_default();

        let row = project.clone();
        self.write(self.atomic, move |conn| {
            Box::pin(async move {
                insert_project(conn, &row).await?;
                insert_pages(conn, &row.id, &pages).await
            })
        })
        .await?;

        tracing::info!(id = %project.id, title = %project.title, "Project saved");
        Ok(project)
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as("SELECT * FROM projects ORDER BY rowid DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let mut projects: Vec<Project> = rows.into_iter().map(Project::from).collect();
        // stable: equal timestamps keep newest-insert-first
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    async fn get(&self, id: &str) -> Result<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Project::from))
    }

    /// Always transactional: a failed update keeps the previous rows.
    async fn update(&self, id: &str, input: ProjectInput) -> Result<Project> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut project = input.into_project(existing.id, Utc::now());
        project.created_at = existing.created_at;
        let pages = project.structure.take().unwrap_or_default();

        let row = project.clone();
        self.write(true, move |conn| {
            Box::pin(async move {
                sqlx::query(
                    "UPDATE projects SET title = ?, description = ?, theme = ?, \
                     primary_color = ?, secondary_color = ?, background_color = ?, \
                     updated_at = ? WHERE id = ?",
                )
                .bind(&row.title)
                .bind(&row.description)
                .bind(&row.theme)
                .bind(&row.primary_color)
                .bind(&row.secondary_color)
                .bind(&row.background_color)
                .bind(row.updated_at)
                .bind(&row.id)
                .execute(&mut *conn)
                .await
                .map_err(db_error)?;

                delete_pages(conn, &row.id).await?;
                insert_pages(conn, &row.id, &pages).await
            })
        })
        .await?;

        Ok(project)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.write(self.atomic, move |conn| {
            Box::pin(async move {
                delete_pages(conn, &id).await?;
                sqlx::query("DELETE FROM projects WHERE id = ?")
                    .bind(&id)
                    .execute(&mut *conn)
                    .await
                    .map_err(db_error)?;
                Ok(())
            })
        })
        .await
    }

    async fn structure(&self, id: &str) -> Result<Option<Vec<Page>>> {
        if self.get(id).await?.is_none() {
            return Ok(None);
        }

        let mut pages = Vec::new();
        for page in self.pages(id).await? {
            let sections = self
                .sections(page.id)
                .await?
                .into_iter()
                .map(|s| Section {
                    kind: s.kind,
                    content: s.content,
                })
                .collect();
            pages.push(Page {
                name: page.name,
                title: page.title,
                sections,
            });
        }
        Ok(Some(pages))
    }

    async fn clear(&self) -> Result<()> {
        self.write(self.atomic, |conn| {
            Box::pin(async move {
                for table in ["sections", "pages", "projects"] {
                    sqlx::query(&format!("DELETE FROM {}", table))
                        .execute(&mut *conn)
                        .await
                        .map_err(db_error)?;
                }
                Ok(())
            })
        })
        .await
    }
}

async fn insert_project(conn: &mut SqliteConnection, project: &Project) -> Result<()> {
    sqlx::query(
        "INSERT INTO projects (id, user_id, title, description, theme, primary_color, \
         secondary_color, background_color, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&project.id)
    .bind(&project.user_id)
    .bind(&project.title)
    .bind(&project.description)
    .bind(&project.theme)
    .bind(&project.primary_color)
    .bind(&project.secondary_color)
    .bind(&project.background_color)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn insert_pages(conn: &mut SqliteConnection, project_id: &str, pages: &[Page]) -> Result<()> {
    for (page_order, page) in pages.iter().enumerate() {
        let page_id = sqlx::query(
            r#"INSERT INTO pages (project_id, name, title, "order") VALUES (?, ?, ?, ?)"#,
        )
        .bind(project_id)
        .bind(&page.name)
        .bind(&page.title)
        .bind(page_order as i64)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?
        .last_insert_rowid();

        for (section_order, section) in page.sections.iter().enumerate() {
            let content = serde_json::to_string(&section.content).map_err(|e| {
                Error::PersistenceFailed(format!("Failed to serialize section content: {}", e))
            })?;
            sqlx::query(
                r#"INSERT INTO sections (page_id, type, content, "order") VALUES (?, ?, ?, ?)"#,
            )
            .bind(page_id)
            .bind(&section.kind)
            .bind(content)
            .bind(section_order as i64)
            .execute(&mut *conn)
            .await
            .map_err(db_error)?;
        }

        tracing::debug!(project_id, page_id, sections = page.sections.len(), "Page inserted");
    }
    Ok(())
}

async fn delete_pages(conn: &mut SqliteConnection, project_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM sections WHERE page_id IN (SELECT id FROM pages WHERE project_id = ?)")
        .bind(project_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    sqlx::query("DELETE FROM pages WHERE project_id = ?")
        .bind(project_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    Ok(())
}

fn db_error(err: sqlx::Error) -> Error {
    Error::PersistenceFailed(err.to_string())
}
