//! Fuzzy picker overlay.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::picker::{PickerMatch, PickerState};
use crate::ui::colors::ColorScheme;
use crate::ui::tree_view::truncate_unicode;

/// Center a `width` x `height` box inside `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the picker: query line on top, ranked results below.
pub fn render_picker(frame: &mut Frame, area: Rect, picker: &PickerState, color_scheme: &ColorScheme) {
    let overlay_area = centered_rect(area, 80, area.height.saturating_sub(6).max(8));
    let bg = Style::default().bg(color_scheme.overlay_bg);

    frame.render_widget(Clear, overlay_area);

    let title = format!(" Open Markdown ({}/{}) ", picker.results.len(), picker.item_count());
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(color_scheme.accent).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color_scheme.accent))
        .style(bg);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let search_style = Style::default()
        .fg(color_scheme.search_fg)
        .add_modifier(Modifier::BOLD);
    let query_line = Line::from(vec![
        Span::styled("> ", search_style),
        Span::styled(picker.query.as_str(), search_style),
        Span::styled("\u{2588}", Style::default().fg(color_scheme.accent)), // Cursor
    ]);
    frame.render_widget(Paragraph::new(query_line).style(bg), sections[0]);

    let list_area = sections[1];
    if picker.results.is_empty() {
        let message = if picker.item_count() == 0 {
            "No Markdown files to search."
        } else {
            "No matches."
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(color_scheme.text_dim))).style(bg);
        frame.render_widget(empty, list_area);
        return;
    }

    let height = list_area.height as usize;
    let width = list_area.width as usize;
    let start = (picker.selected_index + 1).saturating_sub(height);

    let items: Vec<ListItem> = picker
        .results
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, entry)| {
            ListItem::new(build_result_line(entry, index == picker.selected_index, width, color_scheme))
        })
        .collect();

    frame.render_widget(List::new(items).style(bg), list_area);
}

/// One result: the label with matched characters highlighted, then the
/// file name dimmed.
fn build_result_line(
    entry: &PickerMatch,
    is_selected: bool,
    max_width: usize,
    color_scheme: &ColorScheme,
) -> Line<'static> {
    let mut base = Style::default().fg(color_scheme.text);
    if is_selected {
        base = base.fg(color_scheme.selected).add_modifier(Modifier::REVERSED);
    }
    let highlight = base.fg(color_scheme.search_fg).add_modifier(Modifier::BOLD);

    let description = &entry.item.description;
    let label_width = max_width.saturating_sub(description.chars().count() + 4);
    let label = truncate_unicode(&entry.item.label, label_width);

    let mut spans = vec![Span::styled(if is_selected { "> " } else { "  " }, base)];
    for (index, c) in label.chars().enumerate() {
        let style = if entry.label_indices.contains(&index) {
            highlight
        } else {
            base
        };
        spans.push(Span::styled(c.to_string(), style));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        description.clone(),
        Style::default().fg(color_scheme.text_dim),
    ));

    Line::from(spans)
}
