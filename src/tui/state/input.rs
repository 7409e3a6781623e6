//! Single-line text input

use crate::tui::event::TuiEvent;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::theme;

/// Text input buffer with a cursor (byte offset)
#[derive(Debug, Default, Clone)]
pub struct InputState {
    buffer: String,
    cursor: usize,
    masked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input whose content is rendered as `*`
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    /// Create with an initial value, cursor at the end
    pub fn with_value(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.len(),
            masked: false,
        }
    }

    /// Replace the content, cursor at the end
    pub fn set_value(&mut self, value: &str) {
        self.buffer = value.to_string();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_before_cursor(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().last() {
            self.cursor -= c.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    pub fn delete_after_cursor(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().last() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Apply an editing key. Returns whether the key was consumed.
    pub fn handle(&mut self, event: &TuiEvent) -> bool {
        match event {
            TuiEvent::Char(c) => self.insert_char(*c),
            TuiEvent::Backspace => self.delete_before_cursor(),
            TuiEvent::Delete => self.delete_after_cursor(),
            TuiEvent::Left => self.move_cursor_left(),
            TuiEvent::Right => self.move_cursor_right(),
            TuiEvent::Home => self.cursor = 0,
            TuiEvent::End => self.cursor = self.buffer.len(),
            _ => return false,
        }
        true
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Text as shown on screen
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.buffer.chars().count())
        } else {
            self.buffer.clone()
        }
    }

    /// Cursor column on screen
    pub fn visual_cursor_position(&self) -> usize {
        if self.masked {
            self.buffer[..self.cursor].chars().count()
        } else {
            self.buffer[..self.cursor].width()
        }
    }

    /// Field line: `label value`, with a block cursor when focused and a
    /// dimmed placeholder when empty
    pub fn line(&self, label: &str, placeholder: &str, focused: bool) -> Line<'static> {
        let label_style = if focused {
            theme().selected()
        } else {
            theme().normal()
        };
        let mut spans = vec![Span::styled(format!("{} ", label), label_style)];
        let cursor = Span::styled("█".to_string(), theme().selected());

        if self.buffer.is_empty() {
            if focused {
                spans.push(cursor);
            }
            spans.push(Span::styled(placeholder.to_string(), theme().hint()));
            return Line::from(spans);
        }

        let shown = self.display();
        let split = if self.masked {
            self.buffer[..self.cursor].chars().count()
        } else {
            self.cursor
        };
        spans.push(Span::styled(shown[..split].to_string(), theme().normal()));
        if focused {
            spans.push(cursor);
        }
        spans.push(Span::styled(shown[split..].to_string(), theme().normal()));
        Line::from(spans)
    }
}
