//! SSH authorized keys

use crate::session::Session;
use crate::tui::components::{menu_lines, truncate_value};
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::{InputState, SelectionState};
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;

pub const ID: &str = "ssh_keys";

/// Widest key shown in the list
const KEY_WIDTH: usize = 60;

pub struct SshKeysPage {
    selection: SelectionState,
    input: InputState,
    adding: bool,
}

impl SshKeysPage {
    pub fn new() -> Self {
        Self {
            selection: SelectionState::with_count(1),
            input: InputState::new(),
            adding: false,
        }
    }

    fn on_add_row(&self, session: &Session) -> bool {
        self.selection.selected() == session.ssh_keys().len()
    }

    fn handle_list(&mut self, session: &mut Session, event: &TuiEvent) -> Vec<Command> {
        if self.selection.handle(event) {
            return Vec::new();
        }
        match event {
            TuiEvent::Char('d') if !self.on_add_row(session) => {
                session.remove_ssh_key(self.selection.selected());
                self.selection.set_count(session.ssh_keys().len() + 1);
            }
            TuiEvent::Char('a') => self.start_adding(),
            TuiEvent::Enter if self.on_add_row(session) => self.start_adding(),
            TuiEvent::Enter => return vec![Command::goto(super::customization::ID)],
            _ => {}
        }
        Vec::new()
    }

    fn handle_input(&mut self, session: &mut Session, event: &TuiEvent) -> Vec<Command> {
        if *event != TuiEvent::Enter {
            self.input.handle(event);
            return Vec::new();
        }
        self.adding = false;
        let key = self.input.value().trim().to_string();
        if key.is_empty() {
            return Vec::new();
        }
        session.add_ssh_key(key);
        self.selection.set_count(session.ssh_keys().len() + 1);
        vec![Command::goto(super::customization::ID)]
    }

    fn start_adding(&mut self) {
        self.input.clear();
        self.adding = true;
    }
}

impl Default for SshKeysPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for SshKeysPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("ssh.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        if self.adding {
            t!("help.ssh_add").to_string().into()
        } else {
            t!("help.ssh_list").to_string().into()
        }
    }

    fn init(&mut self, session: &mut Session) -> Vec<Command> {
        self.adding = false;
        self.input.clear();
        self.selection = SelectionState::with_count(session.ssh_keys().len() + 1);
        Vec::new()
    }

    fn handle(&mut self, session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        if self.adding {
            self.handle_input(session, event)
        } else {
            self.handle_list(session, event)
        }
    }

    fn render(&self, session: &Session) -> Text<'static> {
        let mut lines = vec![
            Line::styled(t!("ssh.prompt").to_string(), theme().normal()),
            Line::default(),
        ];
        if self.adding {
            lines.push(self.input.line(&t!("ssh.key"), "github:username", true));
            return Text::from(lines);
        }
        let mut items: Vec<String> = session
            .ssh_keys()
            .iter()
            .map(|k| truncate_value(k, KEY_WIDTH))
            .collect();
        items.push(t!("ssh.add").to_string());
        lines.extend(menu_lines(&items, self.selection.selected()));
        Text::from(lines)
    }

    fn captures_text(&self) -> bool {
        self.adding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(page: &mut SshKeysPage, session: &mut Session, event: TuiEvent) -> Vec<Command> {
        page.handle(session, &Message::Key(event))
    }

    #[test]
    fn test_add_key() {
        let mut page = SshKeysPage::new();
        let mut session = Session::new();
        page.init(&mut session);

        key(&mut page, &mut session, TuiEvent::Enter);
        assert!(page.captures_text());
        for c in "github:mudler".chars() {
            key(&mut page, &mut session, TuiEvent::Char(c));
        }
        let commands = key(&mut page, &mut session, TuiEvent::Enter);
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "customization"));
        assert_eq!(session.ssh_keys(), ["github:mudler"]);
        assert!(!page.captures_text());
    }

    #[test]
    fn test_delete_key() {
        let mut page = SshKeysPage::new();
        let mut session = Session::new();
        session.add_ssh_key("github:a");
        session.add_ssh_key("github:b");
        page.init(&mut session);

        key(&mut page, &mut session, TuiEvent::Down);
        key(&mut page, &mut session, TuiEvent::Char('d'));
        assert_eq!(session.ssh_keys(), ["github:a"]);

        // add row: `d` does nothing
        key(&mut page, &mut session, TuiEvent::Char('d'));
        assert_eq!(session.ssh_keys(), ["github:a"]);
    }

    #[test]
    fn test_empty_input_returns_to_list() {
        let mut page = SshKeysPage::new();
        let mut session = Session::new();
        page.init(&mut session);
        key(&mut page, &mut session, TuiEvent::Char('a'));
        let commands = key(&mut page, &mut session, TuiEvent::Enter);
        assert!(commands.is_empty());
        assert!(!page.adding);
        assert!(session.ssh_keys().is_empty());
    }
}
