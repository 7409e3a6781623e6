//! Choice between installing now and customizing first

use crate::session::Session;
use crate::tui::components::menu_lines;
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::SelectionState;
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;

pub const ID: &str = "install_options";

pub struct OptionsPage {
    selection: SelectionState,
}

impl OptionsPage {
    pub fn new() -> Self {
        Self {
            selection: SelectionState::with_count(2),
        }
    }
}

impl Default for OptionsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for OptionsPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("options.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        t!("help.menu").to_string().into()
    }

    fn handle(&mut self, _session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        if self.selection.handle(event) || *event != TuiEvent::Enter {
            return Vec::new();
        }
        match self.selection.selected() {
            0 => vec![Command::goto(super::summary::ID)],
            _ => vec![Command::goto(super::customization::ID)],
        }
    }

    fn render(&self, _session: &Session) -> Text<'static> {
        let items = [t!("options.start").to_string(), t!("options.customize").to_string()];
        let mut lines = vec![
            Line::styled(t!("options.prompt").to_string(), theme().normal()),
            Line::default(),
        ];
        lines.extend(menu_lines(&items, self.selection.selected()));
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        let mut page = OptionsPage::new();
        let mut session = Session::new();
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "summary"));

        page.handle(&mut session, &Message::Key(TuiEvent::Char('j')));
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "customization"));
    }
}
