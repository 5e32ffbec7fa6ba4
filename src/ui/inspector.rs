//! Virtualized rendering of the flattened tree.
//!
//! Only the rows inside the viewport are touched: content, connectors and
//! styling are computed per visible row from the model's scan queries, so a
//! frame costs O(viewport), not O(row count).

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use crate::tree::{ObjectTree, TreeView};

/// Layout facts the caller needs for mouse hit detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectorLayout {
    /// Region occupied by data rows (borders and header excluded).
    pub rows_area: Rect,
}

pub struct InspectorRenderer;

impl InspectorRenderer {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        tree: &ObjectTree,
        view: &mut TreeView,
        theme: &Theme,
        title: &str,
        focused: bool,
    ) -> InspectorLayout {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(if focused {
                Style::default().fg(theme.header_fg)
            } else {
                Style::default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height < 2 || inner.width < 8 {
            return InspectorLayout::default();
        }

        let rows_area = Rect {
            x: inner.x,
            y: inner.y + 1,
            width: inner.width,
            height: inner.height - 1,
        };
        view.set_viewport_height(rows_area.height as usize);
        if let Some((first, last)) = view.take_damage() {
            tracing::trace!(first, last, "shading changed");
        }

        let columns = ColumnWidths::for_width(inner.width as usize);
        let mut lines = Vec::with_capacity(rows_area.height as usize + 1);
        lines.push(Self::header_line(&columns, theme));

        if tree.is_empty() {
            lines.push(Line::from(Span::styled(
                "  (no rows)",
                Style::default().fg(theme.type_fg),
            )));
        } else {
            let scroll = view.scroll();
            let block_span = view.shaded_block();
            for visual in 0..rows_area.height as usize {
                let index = scroll + visual;
                if index >= tree.len() {
                    break;
                }
                lines.push(Self::row_line(tree, view, index, &columns, theme, block_span));
            }
        }

        frame.render_widget(Paragraph::new(lines), inner);
        InspectorLayout { rows_area }
    }

    fn header_line(columns: &ColumnWidths, theme: &Theme) -> Line<'static> {
        let style = Style::default()
            .fg(theme.header_fg)
            .add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled(fit_pad("Name", columns.name), style),
            Span::raw(" "),
            Span::styled(fit_pad("Value", columns.value), style),
            Span::raw(" "),
            Span::styled(fit_pad("Type", columns.type_name), style),
        ])
    }

    fn row_line(
        tree: &ObjectTree,
        view: &TreeView,
        index: usize,
        columns: &ColumnWidths,
        theme: &Theme,
        block_span: Option<(usize, usize)>,
    ) -> Line<'static> {
        let node = tree.node(index);
        let unit = view.options().indent_unit as usize;

        // Guide segments for every ancestor level: the vertical line keeps
        // running while a later subtree of that ancestor is still coming.
        let mut guides = String::new();
        for level in 0..node.level {
            if tree.level_continues_below(index, level) {
                guides.push('│');
                guides.push_str(&" ".repeat(unit.saturating_sub(1)));
            } else {
                guides.push_str(&" ".repeat(unit));
            }
        }

        // Branch at the row's own level: a last sibling ends the line here.
        let mut branch = String::new();
        branch.push(if tree.is_last_visible_sibling(index) {
            '└'
        } else {
            '├'
        });
        for _ in 1..unit {
            branch.push('─');
        }

        let glyph = if node.has_children {
            if node.is_expanded() {
                '▾'
            } else {
                '▸'
            }
        } else {
            '─'
        };

        let prefix_width = guides.width() + branch.width() + 1 + 1;
        let name_width = columns.name.saturating_sub(prefix_width);

        let row_style = if view.selected() == Some(index) {
            Style::default().bg(theme.selection_bg)
        } else if block_span.is_some_and(|(first, last)| (first..=last).contains(&index)) {
            Style::default().bg(theme.shading_bg)
        } else {
            Style::default()
        };

        let guide_style = Style::default().fg(theme.guide_fg);
        let glyph_style = if node.has_children {
            Style::default()
                .fg(theme.header_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            guide_style
        };

        Line::from(vec![
            Span::styled(guides, guide_style),
            Span::styled(branch, guide_style),
            Span::styled(glyph.to_string(), glyph_style),
            Span::raw(" "),
            Span::styled(
                fit_pad(&node.name, name_width),
                Style::default().fg(theme.name_fg),
            ),
            Span::raw(" "),
            Span::styled(
                fit_pad(&node.value, columns.value),
                Style::default().fg(theme.value_fg),
            ),
            Span::raw(" "),
            Span::styled(
                fit_pad(&node.type_name, columns.type_name),
                Style::default().fg(theme.type_fg),
            ),
        ])
        .style(row_style)
    }
}

struct ColumnWidths {
    name: usize,
    value: usize,
    type_name: usize,
}

impl ColumnWidths {
    fn for_width(total: usize) -> Self {
        let type_name = (total / 6).clamp(4, 10);
        let value = total / 3;
        let name = total.saturating_sub(value + type_name + 2);
        Self {
            name,
            value,
            type_name,
        }
    }
}

/// Truncate to `width` display columns (with an ellipsis when cut) and pad
/// with spaces to exactly `width`.
fn fit_pad(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    let mut truncated = false;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            truncated = true;
            break;
        }
        used += w;
        out.push(ch);
    }
    if truncated {
        // drop trailing chars until the ellipsis fits
        while used + 1 > width {
            if let Some(ch) = out.pop() {
                used -= ch.width().unwrap_or(0);
            } else {
                break;
            }
        }
        if width > 0 {
            out.push('…');
            used += 1;
        }
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
