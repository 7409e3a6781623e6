//! Review of every choice before installing

use crate::session::Session;
use crate::tui::components::{menu_lines, truncate_value};
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::SelectionState;
use crate::tui::theme::theme;
use ratatui::text::{Line, Span, Text};
use rust_i18n::t;
use serde_json::{Map, Value};
use std::borrow::Cow;

pub const ID: &str = "summary";

const VALUE_WIDTH: usize = 50;

pub struct SummaryPage {
    selection: SelectionState,
}

impl SummaryPage {
    pub fn new() -> Self {
        Self {
            selection: SelectionState::with_count(2),
        }
    }
}

impl Default for SummaryPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten nested extra fields into `a.b: value` pairs
pub fn flatten_fields(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fn walk(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    walk(&path, child, out);
                }
            }
            Value::String(s) => out.push((prefix.to_string(), s.clone())),
            other => out.push((prefix.to_string(), other.to_string())),
        }
    }

    let mut out = Vec::new();
    for (key, value) in fields {
        walk(key, value, &mut out);
    }
    out
}

fn field(label: String, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), theme().hint()),
        Span::styled(truncate_value(&value, VALUE_WIDTH), theme().normal()),
    ])
}

impl Page for SummaryPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("summary.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        t!("help.menu").to_string().into()
    }

    fn init(&mut self, _session: &mut Session) -> Vec<Command> {
        self.selection.select(0);
        Vec::new()
    }

    fn handle(&mut self, _session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        if self.selection.handle(event) || *event != TuiEvent::Enter {
            return Vec::new();
        }
        match self.selection.selected() {
            0 => vec![Command::Advance],
            _ => vec![Command::goto(super::customization::ID)],
        }
    }

    fn render(&self, session: &Session) -> Text<'static> {
        let not_set = t!("summary.not_set").to_string();
        let user = if session.has_credentials() {
            session.username().to_string()
        } else {
            not_set.clone()
        };
        let mut lines = vec![
            field(t!("summary.device").to_string(), session.device().to_string()),
            field(t!("summary.user").to_string(), user),
            field(
                t!("summary.ssh_keys").to_string(),
                session.ssh_keys().len().to_string(),
            ),
        ];

        let extra = flatten_fields(session.extra_fields());
        if !extra.is_empty() {
            lines.push(Line::default());
            lines.push(Line::styled(t!("summary.extra").to_string(), theme().title()));
            lines.extend(extra.into_iter().map(|(k, v)| field(format!("  {}", k), v)));
        }

        let items = [t!("summary.start").to_string(), t!("summary.back").to_string()];
        lines.push(Line::default());
        lines.extend(menu_lines(&items, self.selection.selected()));
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let mut session = Session::new();
        session.set_path("network.token", json!("abc"));
        session.set_path("k3s.enabled", json!(true));
        let flat = flatten_fields(session.extra_fields());
        assert!(flat.contains(&("network.token".to_string(), "abc".to_string())));
        assert!(flat.contains(&("k3s.enabled".to_string(), "true".to_string())));
    }

    #[test]
    fn test_start_advances() {
        let mut page = SummaryPage::new();
        let mut session = Session::new();
        page.init(&mut session);
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(matches!(&commands[..], [Command::Advance]));

        page.handle(&mut session, &Message::Key(TuiEvent::Down));
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "customization"));
    }
}
