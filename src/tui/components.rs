//! Common UI components module
//!
//! Building blocks shared by the pages and the wizard frame.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::theme::theme;

/// Width of the install progress bar, in cells
pub const PROGRESS_WIDTH: usize = 40;

/// Page layout inside the border: body, help
pub fn page_layout(area: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Min(1), Constraint::Length(2)]).areas(area)
}

/// Bordered block carrying the wizard title
pub fn title_block(title: &str) -> Block<'static> {
    let title_line = Line::from(format!(" {} ", title))
        .centered()
        .style(theme().title());

    Block::bordered()
        .title(title_line)
        .border_type(BorderType::Rounded)
        .border_style(theme().border())
        .style(theme().normal())
}

/// Render bottom hint text
pub fn render_hint(hint: &str, frame: &mut Frame, area: Rect) {
    let hint_widget = Paragraph::new(hint.to_string())
        .style(theme().hint())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(hint_widget, area);
}

/// Centered popup of at most `width` x `height`, cleared before drawing
pub fn render_popup(frame: &mut Frame, area: Rect, width: u16, height: u16, lines: Vec<Line<'static>>) {
    let popup = centered_rect(area, width, height);
    let block = Block::bordered()
        .border_type(BorderType::Double)
        .border_style(theme().error())
        .style(theme().normal());
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

/// Rectangle of `width` x `height` centered in `area`, clipped to it
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Menu entries with a `>` marker on the selected one
pub fn menu_lines<S: AsRef<str>>(items: &[S], selected: usize) -> Vec<Line<'static>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if i == selected {
                Line::styled(format!("> {}", item.as_ref()), theme().selected())
            } else {
                Line::styled(format!("  {}", item.as_ref()), theme().normal())
            }
        })
        .collect()
}

/// `Progress: ████░░░░ 42%`
pub fn progress_line(percent: u16) -> Line<'static> {
    let percent = percent.min(100) as usize;
    let filled = PROGRESS_WIDTH * percent / 100;
    Line::from(vec![
        Span::styled("Progress: ", theme().normal()),
        Span::styled("█".repeat(filled), theme().progress()),
        Span::styled("░".repeat(PROGRESS_WIDTH - filled), theme().progress_track()),
        Span::styled(format!(" {}%", percent), theme().title()),
    ])
}

/// Truncate by display width, avoiding UTF-8 boundary issues
pub fn truncate_value(value: &str, max_width: usize) -> String {
    if value.width() <= max_width {
        return value.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut output = String::new();

    for ch in value.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        output.push(ch);
        current_width += ch_width;
    }

    output.push_str("...");
    output
}
