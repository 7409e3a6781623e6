//! Pages generated from provider prompts

use crate::plugin::{BoolPrompt, Prompt, TextPrompt};
use crate::session::Session;
use crate::tui::components::menu_lines;
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::{InputState, SelectionState};
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

const YES: usize = 0;
const NO: usize = 1;

/// Asks one prompt and stores the answer under its key path
pub struct PromptPage {
    id: String,
    prompt: Prompt,
    input: InputState,
    choice: SelectionState,
}

impl PromptPage {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            id: prompt.page_id(),
            prompt,
            input: InputState::new(),
            choice: SelectionState::with_count(2),
        }
    }

    fn submit_text(prompt: &TextPrompt, input: &InputState, session: &mut Session) -> Vec<Command> {
        let mut value = input.value().trim();
        if value.is_empty() {
            value = prompt.if_empty.as_str();
        }
        if value.is_empty() {
            return Vec::new();
        }
        session.set_path(&prompt.key_path, Value::String(value.to_string()));
        vec![Command::goto(super::customization::ID)]
    }

    fn submit_bool(prompt: &BoolPrompt, choice: &SelectionState, session: &mut Session) -> Vec<Command> {
        let answer = choice.selected() == YES;
        session.set_path(&prompt.key_path, Value::Bool(answer));
        vec![Command::goto(super::customization::ID)]
    }
}

/// Current value of a key path as editable text
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Page for PromptPage {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> Cow<'static, str> {
        Cow::Owned(self.prompt.key_path().to_string())
    }

    fn help(&self) -> Cow<'static, str> {
        match self.prompt {
            Prompt::Text(_) => t!("help.prompt").to_string().into(),
            Prompt::YesNo(_) => t!("help.menu").to_string().into(),
        }
    }

    fn init(&mut self, session: &mut Session) -> Vec<Command> {
        let current = session.get_path(self.prompt.key_path());
        match &self.prompt {
            Prompt::Text(prompt) => {
                let text = current.map(value_text).unwrap_or_else(|| prompt.default.clone());
                self.input.set_value(&text);
            }
            Prompt::YesNo(prompt) => {
                let answer = current.and_then(Value::as_bool).unwrap_or(prompt.default);
                self.choice.select(if answer { YES } else { NO });
            }
        }
        debug!(page = %self.id, "Prompt page ready");
        Vec::new()
    }

    fn handle(&mut self, session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        match &self.prompt {
            Prompt::Text(prompt) => {
                if *event == TuiEvent::Enter {
                    return Self::submit_text(prompt, &self.input, session);
                }
                self.input.handle(event);
            }
            Prompt::YesNo(prompt) => {
                if *event == TuiEvent::Enter {
                    return Self::submit_bool(prompt, &self.choice, session);
                }
                self.choice.handle(event);
            }
        }
        Vec::new()
    }

    fn render(&self, _session: &Session) -> Text<'static> {
        let mut lines = Vec::new();
        match &self.prompt {
            Prompt::Text(prompt) => {
                lines.push(Line::styled(prompt.prompt.clone(), theme().normal()));
                lines.push(Line::default());
                lines.push(self.input.line(">", &prompt.placeholder, true));
            }
            Prompt::YesNo(prompt) => {
                lines.push(Line::styled(prompt.prompt.clone(), theme().normal()));
                lines.push(Line::default());
                let items = [t!("prompt.yes").to_string(), t!("prompt.no").to_string()];
                lines.extend(menu_lines(&items, self.choice.selected()));
            }
        }
        Text::from(lines)
    }

    fn captures_text(&self) -> bool {
        matches!(self.prompt, Prompt::Text(_))
    }
}
