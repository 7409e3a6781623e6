//! Username and password entry

use crate::session::Session;
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::InputState;
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;

pub const ID: &str = "user_password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct UserPage {
    username: InputState,
    password: InputState,
    focus: Field,
    error: Option<String>,
}

impl UserPage {
    pub fn new() -> Self {
        Self {
            username: InputState::new(),
            password: InputState::masked(),
            focus: Field::Username,
            error: None,
        }
    }

    fn focused(&mut self) -> &mut InputState {
        match self.focus {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }

    fn switch_focus(&mut self) {
        self.focus = match self.focus {
            Field::Username => Field::Password,
            Field::Password => Field::Username,
        };
    }
}

impl Default for UserPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for UserPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("user.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        t!("help.user").to_string().into()
    }

    fn init(&mut self, session: &mut Session) -> Vec<Command> {
        self.username.set_value(session.username());
        self.password.set_value(session.password());
        self.focus = Field::Username;
        self.error = None;
        Vec::new()
    }

    fn handle(&mut self, session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        match event {
            TuiEvent::Tab | TuiEvent::Up | TuiEvent::Down => self.switch_focus(),
            TuiEvent::Enter => {
                let (username, password) = (self.username.value().trim(), self.password.value());
                if username.is_empty() || password.is_empty() {
                    self.error = Some(t!("user.required").to_string());
                } else if session.set_credentials(username, password) {
                    return vec![Command::goto(super::customization::ID)];
                }
            }
            other => {
                self.error = None;
                self.focused().handle(other);
            }
        }
        Vec::new()
    }

    fn render(&self, _session: &Session) -> Text<'static> {
        let mut lines = vec![
            Line::styled(t!("user.prompt").to_string(), theme().normal()),
            Line::default(),
            self.username.line(
                &t!("user.username"),
                "",
                self.focus == Field::Username,
            ),
            self.password.line(
                &t!("user.password"),
                "",
                self.focus == Field::Password,
            ),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::default());
            lines.push(Line::styled(error.clone(), theme().error()));
        }
        Text::from(lines)
    }

    fn captures_text(&self) -> bool {
        true
    }
}
