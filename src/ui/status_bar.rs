//! Status line rendering: transient message on the left, position on the
//! right.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, message: &str, position: &str, theme: &Theme) {
        let width = area.width as usize;
        let style = Style::default().fg(theme.status_fg).bg(theme.status_bg);

        let position_width = position.width();
        let message_room = width.saturating_sub(position_width + 3);
        let message = clip(message, message_room);
        let gap = width
            .saturating_sub(1 + message.width() + position_width + 1)
            .max(1);

        let line = Line::from(vec![
            Span::raw(" "),
            Span::raw(message),
            Span::raw(" ".repeat(gap)),
            Span::raw(position.to_string()),
            Span::raw(" "),
        ]);
        frame.render_widget(Paragraph::new(line).style(style), area);
    }
}

fn clip(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
