use anyhow::{Context, Result};
use site_wizard_core::AppConfig;
use site_wizard_generator::ContentGenerator;
use site_wizard_session::{DraftField, EditSession, WizardStep};
use site_wizard_store::ProjectStore;

use super::projects::print_pages;
use super::{open_project_store, read_input, select_generator};

const HELP: &str = "\
Commands:
   title <text>                    Set the site title
   description <text>              Set the description
   theme <text>                    Set the theme
   edit                            Edit section contents
   section <page> <section> <json> Replace one section's content (while editing)
   show                            Print the draft
   back                            Go back one step
   save                            Save the project
   quit                            Leave without saving";

/// One line typed during review or detail editing
#[derive(Debug, Clone, PartialEq)]
enum WizardCommand {
    Field(DraftField, String),
    Edit,
    Section {
        page: usize,
        section: usize,
        raw: String,
    },
    Show,
    Back,
    Save,
    Quit,
    Help,
    Unknown(String),
}

fn parse_command(line: &str) -> WizardCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    if let Some(field) = DraftField::parse(head) {
        return WizardCommand::Field(field, rest.to_string());
    }

    match head {
        "edit" => WizardCommand::Edit,
        "show" => WizardCommand::Show,
        "back" => WizardCommand::Back,
        "save" => WizardCommand::Save,
        "quit" | "exit" => WizardCommand::Quit,
        "help" | "?" => WizardCommand::Help,
        "section" => parse_section(rest).unwrap_or_else(|| WizardCommand::Unknown(line.to_string())),
        _ => WizardCommand::Unknown(line.to_string()),
    }
}

fn parse_section(rest: &str) -> Option<WizardCommand> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let page = parts.next()?.parse().ok()?;
    let section = parts.next()?.parse().ok()?;
    let raw = parts.next()?.trim().to_string();
    Some(WizardCommand::Section { page, section, raw })
}

/// Interactive wizard from an empty session.
pub async fn run(config: &AppConfig, description: Option<String>) -> Result<()> {
    let generator = select_generator(config)?;
    let store = open_project_store(config).await?;

    let mut session = EditSession::new();
    let mut pending = false;
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        session.set_input(description);
        pending = true;
    }

    drive(&mut session, generator.as_ref(), store.as_ref(), pending).await
}

/// Interactive wizard starting in review of a saved project.
pub async fn resume(config: &AppConfig, id: &str) -> Result<()> {
    let generator = select_generator(config)?;
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

    let mut session = EditSession::resume(&project, structure);
    print_draft(&session);
    drive(&mut session, generator.as_ref(), store.as_ref(), false).await
}

async fn drive(
    session: &mut EditSession,
    generator: &dyn ContentGenerator,
    store: &dyn ProjectStore,
    mut pending: bool,
) -> Result<()> {
    loop {
        if session.step() == WizardStep::Describing {
            if !pending {
                let prompt = if session.input().is_empty() {
                    "📝 Describe your website: ".to_string()
                } else {
                    format!("📝 Describe your website [{}]: ", session.input())
                };
                let Some(line) = read_input(&prompt)? else {
                    return Ok(());
                };
                if line == "quit" {
                    return Ok(());
                }
                if !line.is_empty() {
                    session.set_input(line);
                }
            }
            pending = false;

            if session.input().trim().is_empty() {
                continue;
            }

            println!("✨ Generating site outline ({})...", generator.strategy());
            match session.generate(generator).await {
                Ok(_) => {
                    println!();
                    print_draft(session);
                    println!("Type 'help' for commands.");
                }
                Err(e) => eprintln!("✗ {}. Try again.", e),
            }
            continue;
        }

        let Some(line) = read_input(&format!("{}> ", session.step()))? else {
            return Ok(());
        };
        if line.is_empty() {
            continue;
        }

        match parse_command(&line) {
            WizardCommand::Field(field, value) => match session.set_field(field, value) {
                Ok(()) => println!("✓ Updated"),
                Err(e) => eprintln!("✗ {}", e),
            },
            WizardCommand::Edit => match session.open_detail() {
                Ok(()) => {
                    print_pages(session.draft().map(|d| d.pages.as_slice()).unwrap_or_default());
                    println!("Use: section <page> <section> <json>");
                }
                Err(e) => eprintln!("✗ {}", e),
            },
            WizardCommand::Section { page, section, raw } => {
                if session.step() != WizardStep::EditingDetail {
                    eprintln!("✗ Type 'edit' first");
                    continue;
                }
                session.set_section_content(page, section, &raw);
                if session.last_edit_accepted() {
                    println!("✓ Section [{}][{}] updated", page, section);
                } else {
                    eprintln!("⚠ Not applied: needs a JSON object and an existing section");
                }
            }
            WizardCommand::Show => print_draft(session),
            WizardCommand::Back => {
                if let Err(e) = session.back() {
                    eprintln!("✗ {}", e);
                }
            }
            WizardCommand::Save => match session.save(store).await {
                Ok(project) => {
                    println!("✅ Saved: {} ({})", project.title, project.id);
                    println!();
                }
                Err(e) => eprintln!("✗ {}. Your draft is kept.", e),
            },
            WizardCommand::Quit => {
                if session.is_dirty() {
                    println!("Unsaved changes discarded.");
                }
                return Ok(());
            }
            WizardCommand::Help => println!("{}", HELP),
            WizardCommand::Unknown(input) => {
                eprintln!("Unknown command: {}. Type 'help' for commands.", input)
            }
        }
    }
}

fn print_draft(session: &EditSession) {
    let Some(draft) = session.draft() else {
        println!("No draft yet.");
        return;
    };
    println!("🌐 {}", draft.title);
    println!("   Description: {}", draft.description);
    println!("   Theme:       {}", draft.theme);
    println!("   Pages:       {}", draft.pages.len());
    print_pages(&draft.pages);
    if session.is_dirty() {
        println!("   (unsaved changes)");
    }
}
