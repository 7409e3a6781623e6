//! Theme module
//!
//! Fixed Kairos palette and the styles built from it.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

/// Theme colors
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Deep blue background
    pub bg: Color,
    /// Text
    pub fg: Color,
    /// Orange highlight for the selected entry
    pub highlight: Color,
    /// Progress bar fill
    pub highlight2: Color,
    /// Title and accents
    pub accent: Color,
    pub border: Color,
    /// Hint/secondary text
    pub hint: Color,
    pub success: Color,
    pub error: Color,
}

/// Global theme instance
pub static THEME: Theme = Theme {
    bg: Color::Rgb(0x03, 0x15, 0x3a),
    fg: Color::Rgb(0xff, 0xff, 0xff),
    highlight: Color::Rgb(0xe5, 0x6a, 0x44),
    highlight2: Color::Rgb(0xd5, 0x4b, 0x11),
    accent: Color::Rgb(0xee, 0x50, 0x07),
    border: Color::Rgb(0xe5, 0x6a, 0x44),
    hint: Color::Gray,
    success: Color::Green,
    error: Color::Red,
};

impl Default for Theme {
    fn default() -> Self {
        THEME
    }
}

impl Theme {
    /// Normal text style
    pub fn normal(&self) -> Style {
        Style::new().fg(self.fg).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::new()
            .fg(self.accent)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected menu entry
    pub fn selected(&self) -> Style {
        Style::new()
            .fg(self.highlight)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }

    pub fn hint(&self) -> Style {
        Style::new().fg(self.hint).bg(self.bg)
    }

    pub fn success(&self) -> Style {
        Style::new().fg(self.success).bg(self.bg)
    }

    pub fn error(&self) -> Style {
        Style::new()
            .fg(self.error)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Filled part of the progress bar
    pub fn progress(&self) -> Style {
        Style::new().fg(self.highlight2).bg(self.bg)
    }

    /// Unfilled part of the progress bar
    pub fn progress_track(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }

    pub fn styled_line(&self, text: String, style: Style) -> Line<'static> {
        Line::from(text).style(style)
    }
}

/// Get the global theme
pub fn theme() -> &'static Theme {
    &THEME
}
