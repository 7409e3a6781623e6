//! Customization menu
//!
//! Fixed entries plus one entry per provider prompt. Prompt pages are
//! created the first time their prompt is seen and handed to the
//! navigator with [`Command::Register`].

use crate::plugin::{Prompt, PromptSource};
use crate::session::Session;
use crate::tui::components::menu_lines;
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::pages::prompt::PromptPage;
use crate::tui::state::SelectionState;
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;
use tracing::{info, warn};

pub const ID: &str = "customization";

/// What a menu entry leads to
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Finish,
    User,
    SshKeys,
    Prompt { key_path: String, page_id: String },
}

impl Entry {
    fn target(&self) -> &str {
        match self {
            Entry::Finish => super::summary::ID,
            Entry::User => super::user::ID,
            Entry::SshKeys => super::ssh_keys::ID,
            Entry::Prompt { page_id, .. } => page_id.as_str(),
        }
    }

    fn label(&self, session: &Session) -> String {
        let (text, done) = match self {
            Entry::Finish => return t!("customization.finish").to_string(),
            Entry::User => (t!("customization.user").to_string(), session.has_credentials()),
            Entry::SshKeys => (t!("customization.ssh_keys").to_string(), session.has_ssh_keys()),
            Entry::Prompt { key_path, .. } => (
                t!("customization.configure", path = key_path).to_string(),
                session.get_path(key_path).is_some(),
            ),
        };
        if done { format!("{} ✓", text) } else { text }
    }
}

pub struct CustomizationPage {
    source: Box<dyn PromptSource>,
    entries: Vec<Entry>,
    selection: SelectionState,
}

impl CustomizationPage {
    pub fn new(source: Box<dyn PromptSource>) -> Self {
        let entries = vec![Entry::Finish, Entry::User, Entry::SshKeys];
        let selection = SelectionState::with_count(entries.len());
        Self {
            source,
            entries,
            selection,
        }
    }

    /// Number of menu entries
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn has_target(&self, page_id: &str) -> bool {
        self.entries.iter().any(|e| e.target() == page_id)
    }

    /// Ask the prompt source and add entries for prompts not seen before
    fn discover(&mut self) -> Vec<Command> {
        let descriptors = match self.source.prompts() {
            Ok(descriptors) => descriptors,
            Err(e) => {
                warn!(error = %e, "Prompt source failed");
                return Vec::new();
            }
        };

        let mut commands = Vec::new();
        for descriptor in descriptors {
            let prompt = match Prompt::try_from(descriptor) {
                Ok(prompt) => prompt,
                Err(e) => {
                    warn!(error = %e, "Ignoring prompt");
                    continue;
                }
            };
            let page_id = prompt.page_id();
            if self.has_target(&page_id) {
                continue;
            }
            info!(page = %page_id, "Adding customization prompt");
            self.entries.push(Entry::Prompt {
                key_path: prompt.key_path().to_string(),
                page_id,
            });
            commands.push(Command::Register(Box::new(PromptPage::new(prompt))));
        }
        self.selection.set_count(self.entries.len());
        commands
    }
}

impl Page for CustomizationPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("customization.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        t!("help.menu").to_string().into()
    }

    fn init(&mut self, _session: &mut Session) -> Vec<Command> {
        self.discover()
    }

    fn handle(&mut self, _session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        if self.selection.handle(event) || *event != TuiEvent::Enter {
            return Vec::new();
        }
        match self.entries.get(self.selection.selected()) {
            Some(entry) => vec![Command::goto(entry.target())],
            None => Vec::new(),
        }
    }

    fn render(&self, session: &Session) -> Text<'static> {
        let labels: Vec<String> = self.entries.iter().map(|e| e.label(session)).collect();
        let mut lines = vec![
            Line::styled(t!("customization.prompt").to_string(), theme().normal()),
            Line::default(),
        ];
        lines.extend(menu_lines(&labels, self.selection.selected()));
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::plugin::{PromptDescriptor, StaticPrompts};
    use crate::tui::nav::Navigator;

    fn descriptor(section: &str) -> PromptDescriptor {
        PromptDescriptor {
            yaml_section: section.to_string(),
            prompt: format!("Set {}", section),
            ..PromptDescriptor::default()
        }
    }

    fn source() -> Box<dyn PromptSource> {
        Box::new(StaticPrompts(vec![
            descriptor("network.token"),
            descriptor("hostname"),
            descriptor("network.token"),
            descriptor(""),
        ]))
    }

    struct FailingSource;

    impl PromptSource for FailingSource {
        fn prompts(&self) -> Result<Vec<PromptDescriptor>> {
            Err(Error::Plugin {
                plugin: "agent-provider-x".into(),
                message: "unreachable bus".to_string(),
            })
        }
    }

    #[test]
    fn test_repeated_init_adds_no_duplicates() {
        let mut page = CustomizationPage::new(source());
        let mut session = Session::new();

        let first = page.init(&mut session);
        assert_eq!(first.len(), 2);
        assert_eq!(page.entry_count(), 5);

        let second = page.init(&mut session);
        assert!(second.is_empty());
        assert_eq!(page.entry_count(), 5);
    }

    #[test]
    fn test_navigator_registers_each_prompt_once() {
        let mut nav = Navigator::new();
        nav.register(Box::new(CustomizationPage::new(source())));
        let mut session = Session::new();

        nav.start(&mut session);
        if let Some(commands) = nav.activate(ID, &mut session) {
            nav.apply(&mut session, commands);
        }
        assert_eq!(
            nav.page_ids(),
            ["customization", "prompt:network.token", "prompt:hostname"]
        );
    }

    #[test]
    fn test_failing_source_keeps_fixed_entries() {
        let mut page = CustomizationPage::new(Box::new(FailingSource));
        let mut session = Session::new();
        assert!(page.init(&mut session).is_empty());
        assert_eq!(page.entry_count(), 3);
    }

    #[test]
    fn test_entries_route_and_tick() {
        let mut page = CustomizationPage::new(source());
        let mut session = Session::new();
        page.init(&mut session);

        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "summary"));

        for _ in 0..3 {
            page.handle(&mut session, &Message::Key(TuiEvent::Down));
        }
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "prompt:network.token"));

        let entry = &page.entries[3];
        assert!(!entry.label(&session).ends_with('✓'));
        session.set_path("network.token", serde_json::json!("abc"));
        assert!(entry.label(&session).ends_with('✓'));
    }
}
