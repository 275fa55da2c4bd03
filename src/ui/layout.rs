//! Main UI layout and rendering for the mdnav TUI.
//!
//! This module provides the main render function and layout components
//! for the application's terminal user interface.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, StatusKind};
use crate::ui::colors::ColorScheme;
use crate::ui::input::InputMode;
use crate::ui::picker_view::{centered_rect, render_picker};
use crate::ui::tree_view::render_tree_view;

/// Application version string.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
const APP_NAME: &str = "mdnav";

/// Main render function that draws the entire UI.
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Tree
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_header(frame, main_layout[0], app);

    // The tree panel's inner height drives paging and scrolling
    app.viewport_height = main_layout[1].height.saturating_sub(2) as usize;
    app.tree_state.ensure_visible(app.viewport_height);

    let empty_message = app.empty_message();
    render_tree_view(
        frame,
        main_layout[1],
        &app.rows,
        &app.tree_state,
        &app.color_scheme,
        app.ascii,
        &empty_message,
    );

    render_status_bar(frame, main_layout[2], app);

    match app.input_mode {
        InputMode::Help => render_help_overlay(frame, size, &app.color_scheme),
        InputMode::Search => {
            if let Some(picker) = &app.picker {
                render_picker(frame, size, picker, &app.color_scheme);
            }
        }
        InputMode::Normal => {}
    }
}

/// Render the header bar at the top of the screen.
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_style = Style::default()
        .fg(app.color_scheme.header_fg)
        .bg(app.color_scheme.header_bg);

    let title_style = Style::default()
        .fg(app.color_scheme.accent)
        .add_modifier(Modifier::BOLD);

    let path_style = Style::default().fg(app.color_scheme.path_fg);

    let hint_style = Style::default()
        .fg(app.color_scheme.hint_fg)
        .add_modifier(Modifier::DIM);

    let path_str = app
        .provider()
        .root()
        .map(|root| root.to_string_lossy().to_string())
        .unwrap_or_else(|| "(no folder)".to_string());
    let max_path_len = area.width.saturating_sub(50) as usize;
    let display_path = truncate_path(&path_str, max_path_len);

    let header_line = Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("{} v{}", APP_NAME, VERSION), title_style),
        Span::raw(" "),
        Span::styled("\u{2502}", header_style), // Vertical separator
        Span::raw(" "),
        Span::styled(display_path, path_style),
        Span::raw(" "),
        Span::styled("\u{2502}", header_style),
        Span::raw(" "),
        Span::styled(app.provider().mode().display_name(), title_style),
        Span::raw(" "),
        Span::styled("\u{2502}", header_style),
        Span::raw(" "),
        Span::styled("Press ? for help", hint_style),
    ]);

    let header_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.color_scheme.border))
        .style(header_style);

    let header = Paragraph::new(header_line)
        .block(header_block)
        .style(header_style);

    frame.render_widget(header, area);
}

/// Render the status bar at the bottom of the screen.
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status_style = Style::default()
        .fg(app.color_scheme.status_fg)
        .bg(app.color_scheme.status_bg);

    let count_style = Style::default()
        .fg(app.color_scheme.count_fg)
        .add_modifier(Modifier::BOLD);

    let scanning_style = Style::default()
        .fg(app.color_scheme.scanning_fg)
        .add_modifier(Modifier::BOLD);

    let key_style = Style::default()
        .fg(app.color_scheme.key_fg)
        .add_modifier(Modifier::BOLD);

    let hint_style = Style::default().fg(app.color_scheme.hint_fg);

    let mut spans = vec![Span::raw(" ")];

    spans.push(Span::styled(format_file_count(app.provider().file_count()), count_style));
    spans.push(Span::raw(" "));
    spans.push(Span::styled("\u{2502}", status_style));
    spans.push(Span::raw(" "));

    if app.provider().is_loading() {
        let label = if app.is_search_pending() {
            "Scanning... search queued"
        } else {
            "Scanning..."
        };
        spans.push(Span::styled(
            format!("{} {}", app.spinner_char(), label),
            scanning_style,
        ));
    } else if app.provider().last_error().is_some() {
        spans.push(Span::styled(
            "\u{2717} Error",
            Style::default().fg(app.color_scheme.error_fg),
        ));
    } else {
        spans.push(Span::styled("\u{2713} Ready", count_style));
    }

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => app.color_scheme.info_fg,
            StatusKind::Error => app.color_scheme.error_fg,
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled("\u{2502}", status_style));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            truncate_str(&status.text, area.width.saturating_sub(70) as usize),
            Style::default().fg(color),
        ));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled("\u{2502}", status_style));
    spans.push(Span::raw(" "));

    match app.input_mode {
        InputMode::Normal => {
            for (key, label) in [("?", ":help "), ("/", ":find "), ("m", ":mode "), ("r", ":refresh "), ("q", ":quit")] {
                spans.push(Span::styled(key, key_style));
                spans.push(Span::styled(label, hint_style));
            }
        }
        InputMode::Search => {
            spans.push(Span::styled("Enter", key_style));
            spans.push(Span::styled(":open ", hint_style));
            spans.push(Span::styled("Esc", key_style));
            spans.push(Span::styled(":cancel", hint_style));
        }
        InputMode::Help => {}
    }

    let status_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.color_scheme.border))
        .style(status_style);

    let status = Paragraph::new(Line::from(spans))
        .block(status_block)
        .style(status_style);

    frame.render_widget(status, area);
}

/// Format a file count with thousands separators.
fn format_file_count(count: usize) -> String {
    let count_str = count.to_string();
    let mut result = String::new();
    for (i, c) in count_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    let noun = if count == 1 { "file" } else { "files" };
    format!("{} {}", result, noun)
}

/// Truncate a string to a maximum length, adding ellipsis if needed.
/// Respects Unicode character boundaries.
fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_chars).collect()
    }
}

/// Keep the tail of a long path, which is the part that tells folders apart.
fn truncate_path(path: &str, max_chars: usize) -> String {
    let char_count = path.chars().count();
    if char_count > max_chars && max_chars > 3 {
        let skip_count = char_count.saturating_sub(max_chars - 3);
        let suffix: String = path.chars().skip(skip_count).collect();
        format!("...{}", suffix)
    } else {
        path.to_string()
    }
}

/// Render help overlay with all keyboard shortcuts.
fn render_help_overlay(frame: &mut Frame, area: Rect, color_scheme: &ColorScheme) {
    let overlay_area = centered_rect(area, 56, 26);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" mdnav Help ")
        .title_style(Style::default().fg(color_scheme.accent).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color_scheme.accent))
        .style(Style::default().bg(color_scheme.overlay_bg));

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(color_scheme.accent).add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |keys: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<11}", keys), Style::default().fg(color_scheme.key_fg)),
            Span::styled(text, Style::default().fg(color_scheme.text)),
        ])
    };

    let help_text = vec![
        section("Navigation"),
        entry("j/\u{2193}", "Move down"),
        entry("k/\u{2191}", "Move up"),
        entry("l/\u{2192}/Enter", "Expand folder / open file"),
        entry("h/\u{2190}/Bksp", "Collapse / go to parent"),
        entry("g/G", "Go to top/bottom"),
        entry("PgUp/PgDn", "Page up/down"),
        Line::from(""),
        section("Tree"),
        entry("1", "Show README files only"),
        entry("2", "Show all Markdown files"),
        entry("m/Tab", "Toggle mode"),
        entry("r/F5", "Refresh"),
        Line::from(""),
        section("Actions"),
        entry("/ or Ctrl+P", "Find a file by name"),
        entry("c", "Copy path to clipboard"),
        entry("q", "Quit"),
        Line::from(""),
        section("Find"),
        entry("type", "Filter results"),
        entry("\u{2191}/\u{2193}", "Select result"),
        entry("Enter/Esc", "Open / cancel"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(color_scheme.hint_fg))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .style(Style::default().bg(color_scheme.overlay_bg));

    frame.render_widget(paragraph, overlay_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_count() {
        assert_eq!(format_file_count(0), "0 files");
        assert_eq!(format_file_count(1), "1 file");
        assert_eq!(format_file_count(999), "999 files");
        assert_eq!(format_file_count(1000), "1,000 files");
        assert_eq!(format_file_count(1234567), "1,234,567 files");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_path_keeps_tail() {
        assert_eq!(truncate_path("/home/user/project", 40), "/home/user/project");
        assert_eq!(truncate_path("/home/user/project", 10), "...project");
    }
}
