// Draft editing across the describe -> review -> edit wizard steps

use serde_json::Value;
use site_wizard_core::{Error, GeneratedContent, Page, Project, ProjectInput, Result};
use site_wizard_generator::ContentGenerator;
use site_wizard_store::ProjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Describing,
    Reviewing,
    EditingDetail,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Describing => "describing",
            WizardStep::Reviewing => "reviewing",
            WizardStep::EditingDetail => "editing",
        }
    }

    /// Steps reachable through [`EditSession::transition`]. Entering
    /// `Reviewing` from `Describing` needs a draft and goes through
    /// [`EditSession::load_draft`] instead.
    pub fn can_transition_to(self, next: WizardStep) -> bool {
        matches!(
            (self, next),
            (WizardStep::Reviewing, WizardStep::EditingDetail)
                | (WizardStep::EditingDetail, WizardStep::Reviewing)
                | (WizardStep::Reviewing, WizardStep::Describing)
        )
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level draft fields editable during review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Description,
    Theme,
}

impl DraftField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(DraftField::Title),
            "description" => Some(DraftField::Description),
            "theme" => Some(DraftField::Theme),
            _ => None,
        }
    }
}

/// Holds one draft and the wizard step.
///
/// Mutations are synchronous and only touch the held draft. After a
/// successful save the draft is dropped and the session starts over.
#[derive(Debug, Clone)]
pub struct EditSession {
    step: WizardStep,
    input: String,
    draft: Option<GeneratedContent>,
    /// Saved project the draft was reopened from
    resumed: Option<Project>,
    dirty: bool,
    last_edit_accepted: bool,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Describing,
            input: String::new(),
            draft: None,
            resumed: None,
            dirty: false,
            last_edit_accepted: true,
        }
    }

    /// Start from a saved project, in review. Saving updates that project.
    pub fn resume(project: &Project, structure: Vec<Page>) -> Self {
        Self {
            step: WizardStep::Reviewing,
            input: project.description.clone(),
            draft: Some(GeneratedContent::from_project(project, structure)),
            resumed: Some(project.clone()),
            dirty: false,
            last_edit_accepted: true,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn draft(&self) -> Option<&GeneratedContent> {
        self.draft.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the most recent section edit was applied.
    pub fn last_edit_accepted(&self) -> bool {
        self.last_edit_accepted
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Run the generator on the current input and enter review.
    ///
    /// On failure the session stays in `Describing` without a draft, so the
    /// caller can retry.
    pub async fn generate(&mut self, generator: &dyn ContentGenerator) -> Result<&GeneratedContent> {
        self.require_step(WizardStep::Describing, WizardStep::Reviewing)?;
        if self.input.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        let content = generator.generate(&self.input).await?;
        tracing::debug!(strategy = %generator.strategy(), pages = content.pages.len(), "Draft generated");
        self.load_draft(content)
    }

    /// Take a generated draft and enter review with a clean state.
    pub fn load_draft(&mut self, content: GeneratedContent) -> Result<&GeneratedContent> {
        self.require_step(WizardStep::Describing, WizardStep::Reviewing)?;
        content.validate()?;

        self.step = WizardStep::Reviewing;
        self.dirty = false;
        self.last_edit_accepted = true;
        Ok(self.draft.insert(content))
    }

    pub fn transition(&mut self, next: WizardStep) -> Result<()> {
        if !self.step.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.step.as_str(),
                to: next.as_str(),
            });
        }

        if next == WizardStep::Describing {
            // going back to the text input discards the draft
            self.draft = None;
            self.resumed = None;
            self.dirty = false;
        }
        self.step = next;
        Ok(())
    }

    pub fn open_detail(&mut self) -> Result<()> {
        self.transition(WizardStep::EditingDetail)
    }

    /// One step backwards: detail -> review -> describe.
    pub fn back(&mut self) -> Result<()> {
        match self.step {
            WizardStep::EditingDetail => self.transition(WizardStep::Reviewing),
            WizardStep::Reviewing => self.transition(WizardStep::Describing),
            WizardStep::Describing => Err(Error::InvalidTransition {
                from: WizardStep::Describing.as_str(),
                to: WizardStep::Describing.as_str(),
            }),
        }
    }

    /// Replace a top-level field. Any string is accepted, including empty;
    /// defaults are applied by the store, not here.
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) -> Result<()> {
        let draft = self.draft.as_mut().ok_or(Error::NoDraft)?;
        let value = value.into();
        match field {
            DraftField::Title => draft.title = value,
            DraftField::Description => draft.description = value,
            DraftField::Theme => draft.theme = value,
        }
        self.dirty = true;
        Ok(())
    }

    /// Replace one section's content with `raw` parsed as JSON.
    ///
    /// Never fails. Text that is not a JSON object, or an address with no
    /// section, leaves the draft untouched; check
    /// [`last_edit_accepted`](Self::last_edit_accepted) to tell the two apart.
    pub fn set_section_content(&mut self, page: usize, section: usize, raw: &str) {
        let target = self
            .draft
            .as_mut()
            .and_then(|draft| draft.section_mut(page, section));

        let accepted = match (target, serde_json::from_str::<Value>(raw)) {
            (Some(target), Ok(Value::Object(content))) => {
                target.content = content;
                true
            }
            _ => false,
        };

        if accepted {
            self.dirty = true;
        } else {
            tracing::debug!(page, section, "Section edit ignored");
        }
        self.last_edit_accepted = accepted;
    }

    /// Persist the draft. On success the draft is dropped and the session
    /// returns to `Describing`; on failure nothing changes.
    pub async fn save(&mut self, store: &dyn ProjectStore) -> Result<Project> {
        let draft = self.draft.as_ref().ok_or(Error::NoDraft)?;
        draft.validate()?;

        let mut input = ProjectInput::from_draft(draft);
        let project = match &self.resumed {
            Some(existing) => {
                input.primary_color = Some(existing.primary_color.clone());
                input.secondary_color = Some(existing.secondary_color.clone());
                input.background_color = Some(existing.background_color.clone());
                store.update(&existing.id, input).await?
            }
            None => store.save(input).await?,
        };

        *self = Self::new();
        Ok(project)
    }

    fn require_step(&self, expected: WizardStep, next: WizardStep) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.step.as_str(),
                to: next.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use site_wizard_generator::{LocalGenerator, Strategy};
    use site_wizard_store::EmbeddedStore;

    struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        fn strategy(&self) -> Strategy {
            Strategy::Remote
        }

        async fn generate(&self, _description: &str) -> Result<GeneratedContent> {
            Err(Error::GenerationFailed("503 Service Unavailable".into()))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ProjectStore for FailingStore {
        async fn save(&self, _input: ProjectInput) -> Result<Project> {
            Err(Error::PersistenceFailed("disk full".into()))
        }
        async fn list(&self) -> Result<Vec<Project>> {
            Ok(Vec::new())
        }
        async fn get(&self, _id: &str) -> Result<Option<Project>> {
            Ok(None)
        }
        async fn update(&self, _id: &str, _input: ProjectInput) -> Result<Project> {
            Err(Error::PersistenceFailed("disk full".into()))
        }
        async fn delete(&self, _id: &str) -> Result<()> {
            Ok(())
        }
        async fn structure(&self, _id: &str) -> Result<Option<Vec<Page>>> {
            Ok(None)
        }
        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    async fn reviewing() -> EditSession {
        let mut session = EditSession::new();
        session.set_input("אני רוצה אתר צילום");
        session.generate(&LocalGenerator).await.unwrap();
        session
    }

    fn content_of(session: &EditSession, page: usize, section: usize) -> String {
        let section = session.draft().unwrap().section(page, section).unwrap();
        serde_json::to_string(&section.content).unwrap()
    }

    #[tokio::test]
    async fn test_generate_enters_review() {
        let session = reviewing().await;
        assert_eq!(session.step(), WizardStep::Reviewing);
        assert_eq!(session.draft().unwrap().pages.len(), 3);
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_input() {
        let mut session = EditSession::new();
        session.set_input("   ");
        let err = session.generate(&LocalGenerator).await.unwrap_err();
        assert!(matches!(err, Error::EmptyDescription));
        assert_eq!(session.step(), WizardStep::Describing);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_describing() {
        let mut session = EditSession::new();
        session.set_input("bakery");
        let err = session.generate(&FailingGenerator).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.step(), WizardStep::Describing);
        assert!(session.draft().is_none());
        assert_eq!(session.input(), "bakery");
    }

    #[tokio::test]
    async fn test_generate_only_from_describing() {
        let mut session = reviewing().await;
        let err = session.generate(&LocalGenerator).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { from: "reviewing", .. }));
    }

    #[test]
    fn test_cannot_skip_to_detail() {
        let mut session = EditSession::new();
        let err = session.open_detail().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition { from: "describing", to: "editing" }
        ));
        assert!(session.transition(WizardStep::Reviewing).is_err());
        assert!(session.back().is_err());
    }

    #[tokio::test]
    async fn test_review_and_detail_move_both_ways() {
        let mut session = reviewing().await;
        session.open_detail().unwrap();
        assert_eq!(session.step(), WizardStep::EditingDetail);
        assert!(session.transition(WizardStep::Describing).is_err());

        session.back().unwrap();
        assert_eq!(session.step(), WizardStep::Reviewing);
        assert!(session.draft().is_some());
    }

    #[tokio::test]
    async fn test_back_to_describing_discards_draft() {
        let mut session = reviewing().await;
        session.set_field(DraftField::Title, "changed").unwrap();
        session.back().unwrap();

        assert_eq!(session.step(), WizardStep::Describing);
        assert!(session.draft().is_none());
        assert!(!session.is_dirty());
        assert_eq!(session.input(), "אני רוצה אתר צילום");
    }

    #[tokio::test]
    async fn test_set_field_accepts_empty_values() {
        let mut session = reviewing().await;
        session.set_field(DraftField::Title, "").unwrap();
        session.set_field(DraftField::Theme, "wedding").unwrap();

        let draft = session.draft().unwrap();
        assert_eq!(draft.title, "");
        assert_eq!(draft.theme, "wedding");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_set_field_without_draft() {
        let mut session = EditSession::new();
        assert!(matches!(
            session.set_field(DraftField::Description, "x"),
            Err(Error::NoDraft)
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_no_op() {
        let mut session = reviewing().await;
        session.open_detail().unwrap();
        let before = content_of(&session, 0, 1);

        session.set_section_content(0, 1, "{\"title\": \"half");
        assert!(!session.last_edit_accepted());
        assert!(!session.is_dirty());
        assert_eq!(content_of(&session, 0, 1), before);
        assert_eq!(session.step(), WizardStep::EditingDetail);
    }

    #[tokio::test]
    async fn test_valid_json_replaces_only_target_section() {
        let mut session = reviewing().await;
        let before = session.draft().unwrap().clone();

        session.set_section_content(1, 0, r#"{"a":1}"#);
        assert!(session.last_edit_accepted());
        assert!(session.is_dirty());
        assert_eq!(content_of(&session, 1, 0), r#"{"a":1}"#);

        let after = session.draft().unwrap();
        for (p, page) in after.pages.iter().enumerate() {
            for (s, section) in page.sections.iter().enumerate() {
                if (p, s) != (1, 0) {
                    assert_eq!(section, &before.pages[p].sections[s]);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_non_object_json_and_bad_address_are_ignored() {
        let mut session = reviewing().await;
        let before = content_of(&session, 0, 0);

        session.set_section_content(0, 0, "[1, 2]");
        assert!(!session.last_edit_accepted());
        session.set_section_content(0, 9, "{}");
        assert!(!session.last_edit_accepted());
        session.set_section_content(7, 0, "{}");
        assert!(!session.last_edit_accepted());

        assert_eq!(content_of(&session, 0, 0), before);

        session.set_section_content(0, 0, "{}");
        assert!(session.last_edit_accepted());
    }

    #[test]
    fn test_section_edit_without_draft_is_ignored() {
        let mut session = EditSession::new();
        session.set_section_content(0, 0, "{}");
        assert!(!session.last_edit_accepted());
    }

    #[tokio::test]
    async fn test_save_resets_session() {
        let store = EmbeddedStore::in_memory();
        let mut session = reviewing().await;
        session.set_field(DraftField::Theme, "").unwrap();

        let project = session.save(&store).await.unwrap();
        assert_eq!(project.theme, site_wizard_core::DEFAULT_THEME);
        assert_eq!(session.step(), WizardStep::Describing);
        assert!(session.draft().is_none());
        assert_eq!(session.input(), "");

        let structure = store.structure(&project.id).await.unwrap().unwrap();
        assert_eq!(structure.len(), 3);
    }

    #[tokio::test]
    async fn test_save_with_cleared_title_uses_default() {
        let store = EmbeddedStore::in_memory();
        let mut session = reviewing().await;
        session.set_field(DraftField::Title, "").unwrap();

        let project = session.save(&store).await.unwrap();
        assert_eq!(project.title, site_wizard_core::DEFAULT_PROJECT_TITLE);
        assert_eq!(
            store.list().await.unwrap()[0].title,
            site_wizard_core::DEFAULT_PROJECT_TITLE
        );
    }

    #[tokio::test]
    async fn test_save_failure_keeps_draft() {
        let mut session = reviewing().await;
        session.open_detail().unwrap();
        session.set_section_content(0, 0, r#"{"heading": "x"}"#);

        let err = session.save(&FailingStore).await.unwrap_err();
        assert!(matches!(err, Error::PersistenceFailed(_)));
        assert_eq!(session.step(), WizardStep::EditingDetail);
        assert!(session.is_dirty());
        assert_eq!(content_of(&session, 0, 0), r#"{"heading":"x"}"#);
    }

    #[tokio::test]
    async fn test_save_without_draft() {
        let mut session = EditSession::new();
        let err = session.save(&EmbeddedStore::in_memory()).await.unwrap_err();
        assert!(matches!(err, Error::NoDraft));
    }

    #[tokio::test]
    async fn test_resume_updates_existing_project() {
        let store = EmbeddedStore::in_memory();
        let project = reviewing().await.save(&store).await.unwrap();

        let structure = store.structure(&project.id).await.unwrap().unwrap();
        let mut session = EditSession::resume(&project, structure);
        assert_eq!(session.step(), WizardStep::Reviewing);
        session.set_field(DraftField::Title, "Renamed").unwrap();

        let updated = session.save(&store).await.unwrap();
        assert_eq!(updated.id, project.id);
        assert_eq!(updated.primary_color, project.primary_color);
        assert_eq!(updated.created_at, project.created_at);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Renamed");
    }

    #[test]
    fn test_draft_field_names() {
        assert_eq!(DraftField::parse("theme"), Some(DraftField::Theme));
        assert_eq!(DraftField::parse("colors"), None);
    }
}
