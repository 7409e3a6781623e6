//! Event handling module
//!
//! Uses crossterm for terminal event handling.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Event poll interval (milliseconds)
const TICK_RATE: u64 = 50;

/// Event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Character input
    Char(char),
    /// Ctrl+C, the interrupt key
    CtrlC,
    /// Window resize
    Resize(u16, u16),
    /// Home key
    Home,
    /// End key
    End,
    /// No event (timeout)
    None,
}

impl TuiEvent {
    /// Up arrow or `k`
    pub fn is_up(&self) -> bool {
        matches!(self, TuiEvent::Up | TuiEvent::Char('k'))
    }

    /// Down arrow or `j`
    pub fn is_down(&self) -> bool {
        matches!(self, TuiEvent::Down | TuiEvent::Char('j'))
    }

    /// Whether this is a key press (resize and timeouts are not)
    pub fn is_key(&self) -> bool {
        !matches!(self, TuiEvent::None | TuiEvent::Resize(_, _))
    }
}

impl From<Event> for TuiEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key_event) => key_event.into(),
            Event::Resize(width, height) => TuiEvent::Resize(width, height),
            Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {
                TuiEvent::None
            }
        }
    }
}

impl From<KeyEvent> for TuiEvent {
    fn from(key: KeyEvent) -> Self {
        // Ignore non-press events
        if key.kind != KeyEventKind::Press {
            return TuiEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return TuiEvent::CtrlC;
        }

        match key.code {
            KeyCode::Esc => TuiEvent::Escape,
            KeyCode::Enter => TuiEvent::Enter,
            KeyCode::Up => TuiEvent::Up,
            KeyCode::Down => TuiEvent::Down,
            KeyCode::Left => TuiEvent::Left,
            KeyCode::Right => TuiEvent::Right,
            KeyCode::Tab | KeyCode::BackTab => TuiEvent::Tab,
            KeyCode::Backspace => TuiEvent::Backspace,
            KeyCode::Delete => TuiEvent::Delete,
            KeyCode::Char(c) => TuiEvent::Char(c),
            KeyCode::Home => TuiEvent::Home,
            KeyCode::End => TuiEvent::End,
            _ => TuiEvent::None,
        }
    }
}

/// Event poller
#[derive(Debug)]
pub struct EventPoll {
    tick_rate: Duration,
}

impl EventPoll {
    /// Create new event poller
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for the next event
    pub fn next(&self) -> TuiEvent {
        if event::poll(self.tick_rate).unwrap_or(false) {
            event::read().map(TuiEvent::from).unwrap_or(TuiEvent::None)
        } else {
            TuiEvent::None
        }
    }
}

impl Default for EventPoll {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE))
    }
}
