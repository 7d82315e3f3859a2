use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Untyped section payload. Its shape is a convention per section type.
pub type SectionContent = Map<String, Value>;

/// Section types the generators know how to fill. Other tags are accepted.
pub const SECTION_TYPES: &[&str] = &[
    "hero",
    "about",
    "services",
    "features",
    "testimonials",
    "contact",
    "gallery",
    "pricing",
    "faq",
];

pub const DEFAULT_PROJECT_TITLE: &str = "פרויקט ללא שם";
pub const DEFAULT_THEME: &str = "כללי";
pub const DEFAULT_PRIMARY_COLOR: &str = "#1D4ED8";
pub const DEFAULT_SECONDARY_COLOR: &str = "#9333EA";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#F8FAFC";

pub fn is_known_section_type(kind: &str) -> bool {
    SECTION_TYPES.contains(&kind)
}

/// A draft site outline, as produced by a generator and mutated by the
/// edit session. Has no id until it is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub theme: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Slug. Empty in a draft means "derive from position on save".
    #[serde(default)]
    pub name: String,
    pub title: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: SectionContent,
}

impl GeneratedContent {
    /// Re-check a typed draft before it leaves the session. Empty top-level
    /// fields are allowed here; the store fills in their defaults.
    pub fn validate(&self) -> Result<()> {
        for (i, page) in self.pages.iter().enumerate() {
            for (j, section) in page.sections.iter().enumerate() {
                if section.kind.is_empty() {
                    return Err(Error::malformed(format!("pages[{}].sections[{}].type", i, j)));
                }
            }
        }
        Ok(())
    }

    pub fn section(&self, page: usize, section: usize) -> Option<&Section> {
        self.pages.get(page)?.sections.get(section)
    }

    pub fn section_mut(&mut self, page: usize, section: usize) -> Option<&mut Section> {
        self.pages.get_mut(page)?.sections.get_mut(section)
    }

    /// Rebuild a draft from a saved project so it can be edited again.
    pub fn from_project(project: &Project, structure: Vec<Page>) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            theme: project.theme.clone(),
            pages: structure,
        }
    }
}

/// Stored project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: Option<String>,
    pub title: String,
    pub description: String,
    pub theme: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Embedded pages, present only for the embedded storage shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Vec<Page>>,
}

/// What a caller hands to a store. Empty fields get defaults on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Vec<Page>>,
}

impl ProjectInput {
    /// Map a draft to store input. Page order is kept and blank page names
    /// become `page-N` by 1-based position.
    pub fn from_draft(draft: &GeneratedContent) -> Self {
        let structure = draft
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| Page {
                name: page_name_or_default(&page.name, index),
                title: page.title.clone(),
                sections: page.sections.clone(),
            })
            .collect();

        Self {
            title: draft.title.clone(),
            description: draft.description.clone(),
            theme: draft.theme.clone(),
            primary_color: None,
            secondary_color: None,
            background_color: None,
            structure: Some(structure),
        }
    }

    /// Build the stored record, applying defaults for empty fields.
    pub fn into_project(self, id: String, now: DateTime<Utc>) -> Project {
        Project {
            id,
            user_id: None,
            title: or_default(self.title, DEFAULT_PROJECT_TITLE),
            description: self.description,
            theme: or_default(self.theme, DEFAULT_THEME),
            primary_color: or_default(self.primary_color.unwrap_or_default(), DEFAULT_PRIMARY_COLOR),
            secondary_color: or_default(
                self.secondary_color.unwrap_or_default(),
                DEFAULT_SECONDARY_COLOR,
            ),
            background_color: or_default(
                self.background_color.unwrap_or_default(),
                DEFAULT_BACKGROUND_COLOR,
            ),
            created_at: now,
            updated_at: now,
            structure: self.structure,
        }
    }
}

pub fn page_name_or_default(name: &str, index: usize) -> String {
    if name.trim().is_empty() {
        format!("page-{}", index + 1)
    } else {
        name.to_string()
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Page row in the normalized shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: i64,
    pub project_id: String,
    pub name: String,
    pub title: String,
    pub order: i64,
}

/// Section row in the normalized shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: i64,
    pub page_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: SectionContent,
    pub order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(kind: &str, content: Value) -> Section {
        Section {
            kind: kind.to_string(),
            content: content.as_object().cloned().unwrap(),
        }
    }

    fn draft() -> GeneratedContent {
        GeneratedContent {
            title: "Studio".to_string(),
            description: String::new(),
            theme: String::new(),
            pages: vec![
                Page {
                    name: "home".to_string(),
                    title: "Home".to_string(),
                    sections: vec![section("hero", json!({"heading": "Hi"}))],
                },
                Page {
                    name: String::new(),
                    title: "Gallery".to_string(),
                    sections: vec![section("gallery", json!({}))],
                },
            ],
        }
    }

    #[test]
    fn test_from_draft_defaults_page_names_by_position() {
        let input = ProjectInput::from_draft(&draft());
        let structure = input.structure.unwrap();
        assert_eq!(structure[0].name, "home");
        assert_eq!(structure[1].name, "page-2");
        assert_eq!(structure[1].sections[0].kind, "gallery");
    }

    #[test]
    fn test_into_project_applies_defaults() {
        let now = Utc::now();
        let project = ProjectInput::default().into_project("p1".to_string(), now);
        assert_eq!(project.title, DEFAULT_PROJECT_TITLE);
        assert_eq!(project.description, "");
        assert_eq!(project.theme, DEFAULT_THEME);
        assert_eq!(project.primary_color, "#1D4ED8");
        assert_eq!(project.secondary_color, "#9333EA");
        assert_eq!(project.background_color, "#F8FAFC");
        assert_eq!(project.created_at, project.updated_at);
        assert!(project.user_id.is_none());
    }

    #[test]
    fn test_into_project_keeps_given_values() {
        let input = ProjectInput {
            title: "Bakery".to_string(),
            theme: "food".to_string(),
            primary_color: Some("#000000".to_string()),
            secondary_color: Some(String::new()),
            ..Default::default()
        };
        let project = input.into_project("p1".to_string(), Utc::now());
        assert_eq!(project.title, "Bakery");
        assert_eq!(project.theme, "food");
        assert_eq!(project.primary_color, "#000000");
        // empty string counts as unset
        assert_eq!(project.secondary_color, DEFAULT_SECONDARY_COLOR);
    }

    #[test]
    fn test_validate_allows_empty_title() {
        let mut content = draft();
        content.title.clear();
        content.theme.clear();
        assert!(content.validate().is_ok());

        let project = ProjectInput::from_draft(&content).into_project("p1".to_string(), Utc::now());
        assert_eq!(project.title, DEFAULT_PROJECT_TITLE);
        assert_eq!(project.theme, DEFAULT_THEME);
    }

    #[test]
    fn test_validate_rejects_empty_section_type() {
        let mut content = draft();
        content.pages[0].sections[0].kind.clear();
        let err = content.validate().unwrap_err();
        assert!(
            matches!(err, Error::MalformedContent { ref path } if path == "pages[0].sections[0].type")
        );
    }

    #[test]
    fn test_section_serializes_type_field() {
        let value = serde_json::to_value(section("faq", json!({"items": []}))).unwrap();
        assert_eq!(value, json!({"type": "faq", "content": {"items": []}}));
    }

    #[test]
    fn test_section_lookup_out_of_range() {
        let content = draft();
        assert!(content.section(0, 0).is_some());
        assert!(content.section(0, 1).is_none());
        assert!(content.section(5, 0).is_none());
    }

    #[test]
    fn test_known_section_types_are_informational() {
        assert!(is_known_section_type("pricing"));
        assert!(!is_known_section_type("timeline"));
    }
}
