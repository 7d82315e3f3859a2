use anyhow::{Context, Result};
use site_wizard_core::{AppConfig, DEFAULT_PROJECT_TITLE, Page, Project};

use super::open_project_store;

const NO_DESCRIPTION: &str = "אין תיאור";

pub async fn list(config: &AppConfig) -> Result<()> {
    let store = open_project_store(config).await?;
    let projects = store.list().await.context("Failed to list projects")?;

    if projects.is_empty() {
        println!("No saved projects. Start one with: site-wizard new");
        return Ok(());
    }

    println!("📋 {} project(s):", projects.len());
    println!();
    for project in &projects {
        println!("{}", summary_line(project));
    }
    Ok(())
}

pub async fn show(config: &AppConfig, id: &str) -> Result<()> {
    let store = open_project_store(config).await?;
    let project = store
        .get(id)
        .await
        .context("Failed to read project")?
        .with_context(|| format!("Project not found: {}", id))?;
    let structure = store
        .structure(id)
        .await
        .context("Failed to read project structure")?
        .unwrap_or_default();

    println!("{}", title_or_default(&project.title));
    println!("   ID:          {}", project.id);
    println!("   Description: {}", description_or_default(&project.description));
    println!("   Theme:       {}", project.theme);
    println!(
        "   Colors:      {} / {} / {}",
        project.primary_color, project.secondary_color, project.background_color
    );
    println!("   Updated:     {}", project.updated_at.format("%Y-%m-%d %H:%M"));
    println!();
    print_pages(&structure);
    Ok(())
}

pub async fn delete(config: &AppConfig, id: &str) -> Result<()> {
    let store = open_project_store(config).await?;
    store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete project {}", id))?;
    println!("✓ Deleted {}", id);
    Ok(())
}

/// Indexed page and section listing used by `show` and the wizard.
pub fn print_pages(pages: &[Page]) {
    for (p, page) in pages.iter().enumerate() {
        let name = if page.name.is_empty() { "-" } else { page.name.as_str() };
        println!("  [{}] {} ({})", p, page.title, name);
        for (s, section) in page.sections.iter().enumerate() {
            let content = serde_json::to_string(&section.content).unwrap_or_default();
            println!("      [{}] {:<12} {}", s, section.kind, content);
        }
    }
}

fn summary_line(project: &Project) -> String {
    format!(
        "{}  {}  ({})\n    {}",
        project.id,
        title_or_default(&project.title),
        project.updated_at.format("%Y-%m-%d"),
        description_or_default(&project.description)
    )
}

fn title_or_default(title: &str) -> &str {
    if title.trim().is_empty() {
        DEFAULT_PROJECT_TITLE
    } else {
        title
    }
}

fn description_or_default(description: &str) -> &str {
    if description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_wizard_core::ProjectInput;

    #[test]
    fn test_summary_uses_fallbacks_for_blank_fields() {
        let mut project = ProjectInput::default().into_project("abc".into(), chrono_now());
        project.title = String::new();
        project.description = "  ".into();

        let line = summary_line(&project);
        assert!(line.starts_with("abc  פרויקט ללא שם"));
        assert!(line.ends_with("אין תיאור"));
    }

    #[test]
    fn test_summary_keeps_real_values() {
        let input = ProjectInput {
            title: "Studio".into(),
            description: "Wedding photos".into(),
            ..Default::default()
        };
        let line = summary_line(&input.into_project("id-1".into(), chrono_now()));
        assert!(line.contains("Studio"));
        assert!(line.contains("Wedding photos"));
    }

    fn chrono_now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}
