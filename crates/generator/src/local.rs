use async_trait::async_trait;
use serde_json::{Map, Value, json};
use site_wizard_core::{GeneratedContent, Page, Result, Section};

use crate::{ContentGenerator, Strategy};

const TITLE_PREFIX: &str = "אתר עבור";
const TITLE_MAX_CHARS: usize = 40;
const PLACEHOLDER_TITLE: &str = "אתר חדש שנוצר באשף";
const PLACEHOLDER_THEME: &str = "מותאם אישית";
const PLACEHOLDER_DESCRIPTION: &str =
    "אשף הפרויקטים יוצר עבורך מבנה אתר בסיסי שניתן לערוך בקלות.";
const PLACEHOLDER_HEADING: &str = "בואו לבנות איתנו אתר ייחודי";
const PLACEHOLDER_ABOUT: &str = "הגיע הזמן לספר לעולם עליכם ועל מה שאתם מציעים.";
const THEME_WORDS: usize = 3;

/// Network-free generator. Always yields the same three-page skeleton
/// (home, services, contact), filled from the description where it fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGenerator;

#[async_trait]
impl ContentGenerator for LocalGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Local
    }

    async fn generate(&self, description: &str) -> Result<GeneratedContent> {
        Ok(synthesize(description))
    }
}

/// Build the skeleton for `description`. Never fails.
pub fn synthesize(description: &str) -> GeneratedContent {
    let description = description.trim();
    let has_description = !description.is_empty();

    let title = if has_description {
        format!("{} {}", TITLE_PREFIX, first_sentence(description, TITLE_MAX_CHARS))
    } else {
        PLACEHOLDER_TITLE.to_string()
    };
    let hero_heading = if has_description { description } else { PLACEHOLDER_HEADING };
    let about_body = if has_description { description } else { PLACEHOLDER_ABOUT };
    let cta = if has_description { "דברו איתי עכשיו" } else { "למידע נוסף" };

    let pages = vec![
        Page {
            name: "home".to_string(),
            title: "דף הבית".to_string(),
            sections: vec![
                section(
                    "hero",
                    json!({
                        "heading": hero_heading,
                        "subheading": "פתרונות דיגיטליים מותאמים אישית לצרכים שלכם",
                        "cta": cta,
                    }),
                ),
                section(
                    "about",
                    json!({
                        "title": "מי אנחנו",
                        "body": about_body,
                    }),
                ),
            ],
        },
        Page {
            name: "services".to_string(),
            title: "שירותים".to_string(),
            sections: vec![
                section(
                    "services",
                    json!({
                        "title": "מה אנחנו מציעים",
                        "items": [
                            "פתרונות מותאמים אישית",
                            "תכנון חווית משתמש",
                            "תמיכה וליווי מתמשך",
                        ],
                    }),
                ),
                section(
                    "features",
                    json!({
                        "title": "למה לבחור בנו",
                        "items": [
                            "גישה מקצועית וקשובה",
                            "עיצוב עכשווי ונקי",
                            "התמקדות בתוצאות עסקיות",
                        ],
                    }),
                ),
            ],
        },
        Page {
            name: "contact".to_string(),
            title: "צור קשר".to_string(),
            sections: vec![
                section(
                    "contact",
                    json!({
                        "title": "נשמח לשמוע מכם",
                        "description": "צרו קשר ונבנה יחד אתר מדויק לצרכים שלכם",
                        "cta": "שלחו הודעה",
                    }),
                ),
                section(
                    "faq",
                    json!({
                        "title": "שאלות נפוצות",
                        "items": [
                            {
                                "question": "כמה זמן לוקח לבנות אתר?",
                                "answer": "רוב הפרויקטים מסתיימים תוך מספר שבועות.",
                            },
                            {
                                "question": "מה נדרש ממני כדי להתחיל?",
                                "answer": "תיאור קצר של המטרה והחזון שלכם.",
                            },
                        ],
                    }),
                ),
            ],
        },
    ];

    GeneratedContent {
        title,
        description: if has_description {
            description.to_string()
        } else {
            PLACEHOLDER_DESCRIPTION.to_string()
        },
        theme: summarize_theme(description),
        pages,
    }
}

/// Text before the first `.`, `!` or `?`, cut to `max_chars` characters.
pub fn first_sentence(text: &str, max_chars: usize) -> String {
    text.split(['.', '!', '?'])
        .next()
        .unwrap_or_default()
        .chars()
        .take(max_chars)
        .collect()
}

/// First three words with `.,!?` removed, or a placeholder when none remain.
pub fn summarize_theme(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?'))
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().take(THEME_WORDS).collect();

    if words.is_empty() {
        PLACEHOLDER_THEME.to_string()
    } else {
        words.join(" ")
    }
}

fn section(kind: &str, content: Value) -> Section {
    let content = match content {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Section {
        kind: kind.to_string(),
        content,
    }
}
