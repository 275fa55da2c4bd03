//! Tree view widget for the mdnav TUI.
//!
//! Renders the flattened list of visible rows with indentation, folder
//! expansion markers and file icons.

use std::collections::HashSet;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::provider::{FileKind, TreeItem};
use crate::ui::colors::ColorScheme;

/// Safely truncate a string respecting Unicode character boundaries.
pub fn truncate_unicode(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

/// One row of the flattened, expanded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub item: TreeItem,
    pub depth: usize,
    /// Only meaningful for folders
    pub expanded: bool,
}

impl VisibleRow {
    /// Stable identity of the row across rebuilds.
    pub fn key(&self) -> &str {
        match &self.item {
            TreeItem::Loading => "",
            TreeItem::Folder { path, .. } => path,
            TreeItem::File { handle, .. } => handle.relative(),
        }
    }
}

/// Selection, scroll and expansion state of the tree view.
#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    /// Index of the currently selected row.
    pub selected_index: usize,
    /// First visible row.
    pub scroll_offset: usize,
    /// Root-relative paths of expanded folders.
    pub expanded: HashSet<String>,
}

impl TreeViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the expansion state of a folder.
    pub fn toggle_expand(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_next(&mut self, max_index: usize) {
        if self.selected_index < max_index {
            self.selected_index += 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self, max_index: usize) {
        self.selected_index = max_index;
    }

    /// Ensure the selected item is visible by adjusting scroll offset.
    pub fn ensure_visible(&mut self, visible_height: usize) {
        if visible_height == 0 {
            self.scroll_offset = self.scroll_offset.min(self.selected_index);
            return;
        }

        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }
}

/// Icon for a row. `ascii` selects plain characters for limited terminals.
fn get_icon(item: &TreeItem, expanded: bool, ascii: bool) -> &'static str {
    match (item, ascii) {
        (TreeItem::Loading, false) => "\u{23f3}", // Hourglass
        (TreeItem::Loading, true) => "~",
        (TreeItem::Folder { .. }, false) if expanded => "\u{25be} \u{1f4c2}",
        (TreeItem::Folder { .. }, false) => "\u{25b8} \u{1f4c1}",
        (TreeItem::Folder { .. }, true) if expanded => "-",
        (TreeItem::Folder { .. }, true) => "+",
        (TreeItem::File { kind: FileKind::Readme, .. }, false) => "\u{1f4d8}", // Blue book
        (TreeItem::File { .. }, false) => "\u{1f4c4}",
        (TreeItem::File { kind: FileKind::Readme, .. }, true) => "*",
        (TreeItem::File { .. }, true) => ".",
    }
}

/// Render the tree view widget.
///
/// `empty_message` is shown in place of the list when there are no rows.
pub fn render_tree_view(
    frame: &mut Frame,
    area: Rect,
    rows: &[VisibleRow],
    state: &TreeViewState,
    color_scheme: &ColorScheme,
    ascii: bool,
    empty_message: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color_scheme.border))
        .title(" Markdown ");

    if rows.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            empty_message.to_string(),
            Style::default().fg(color_scheme.text_dim),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;

    let start_index = state.scroll_offset.min(rows.len());
    let end_index = (start_index + inner_height).min(rows.len());

    let items: Vec<ListItem> = rows[start_index..end_index]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let is_selected = start_index + offset == state.selected_index;
            ListItem::new(build_tree_line(row, inner_width, color_scheme, is_selected, ascii))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Build a single line for the tree view.
fn build_tree_line(
    row: &VisibleRow,
    max_width: usize,
    color_scheme: &ColorScheme,
    is_selected: bool,
    ascii: bool,
) -> Line<'static> {
    let indent = "  ".repeat(row.depth);
    let icon = get_icon(&row.item, row.expanded, ascii);

    let color = match &row.item {
        TreeItem::Loading => color_scheme.loading,
        TreeItem::Folder { .. } => color_scheme.folder,
        TreeItem::File { kind, .. } => color_scheme.file_color(*kind),
    };

    let name_max_len = max_width
        .saturating_sub(indent.len())
        .saturating_sub(icon.width() + 1);
    let name = truncate_unicode(row.item.label(), name_max_len);

    let mut name_style = Style::default().fg(if row.item.is_folder() {
        color_scheme.folder
    } else if matches!(row.item, TreeItem::Loading) {
        color_scheme.loading
    } else {
        color_scheme.text
    });
    if is_selected {
        name_style = name_style
            .fg(color_scheme.selected)
            .add_modifier(Modifier::REVERSED);
    }
    if matches!(row.item, TreeItem::Loading) {
        name_style = name_style.add_modifier(Modifier::ITALIC);
    }

    Line::from(vec![
        Span::raw(indent),
        Span::styled(format!("{} ", icon), Style::default().fg(color)),
        Span::styled(name, name_style),
    ])
}
