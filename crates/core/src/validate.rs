use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{GeneratedContent, Page, Section};

/// Check a decoded JSON value against the content model and convert it.
///
/// The value is valid when it is an object with a non-empty string `title`,
/// optional string `description` and `theme`, and a `pages` array. Every page
/// needs a string `title` (a string `name` is optional) and a `sections`
/// array whose entries carry a string `type` and an object `content`.
///
/// The first violation is reported as [`Error::MalformedContent`] with its
/// path, e.g. `pages[2].sections[0].content`.
pub fn validate_generated(value: &Value) -> Result<GeneratedContent> {
    let root = value.as_object().ok_or_else(|| Error::malformed("$"))?;

    let title = match root.get("title") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(Error::malformed("title")),
    };
    let description = optional_string(root, "description", "description")?;
    let theme = optional_string(root, "theme", "theme")?;

    let raw_pages = root
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed("pages"))?;

    let pages = raw_pages
        .iter()
        .enumerate()
        .map(|(i, page)| validate_page(page, i))
        .collect::<Result<Vec<_>>>()?;

    Ok(GeneratedContent {
        title,
        description,
        theme,
        pages,
    })
}

fn validate_page(value: &Value, index: usize) -> Result<Page> {
    let path = format!("pages[{}]", index);
    let page = value.as_object().ok_or_else(|| Error::malformed(&path))?;

    let title = match page.get("title") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(Error::malformed(format!("{}.title", path))),
    };
    let name = optional_string(page, "name", &format!("{}.name", path))?;

    let sections = page
        .get("sections")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed(format!("{}.sections", path)))?
        .iter()
        .enumerate()
        .map(|(j, section)| validate_section(section, &format!("{}.sections[{}]", path, j)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        name,
        title,
        sections,
    })
}

fn validate_section(value: &Value, path: &str) -> Result<Section> {
    let section = value.as_object().ok_or_else(|| Error::malformed(path))?;

    let kind = match section.get("type") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(Error::malformed(format!("{}.type", path))),
    };
    let content = match section.get("content") {
        Some(Value::Object(map)) => map.clone(),
        _ => return Err(Error::malformed(format!("{}.content", path))),
    };

    Ok(Section { kind, content })
}

/// Absent or null reads as an empty string; anything but a string is malformed.
fn optional_string(map: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(Error::malformed(path)),
    }
}
