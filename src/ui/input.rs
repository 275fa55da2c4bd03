//! Input handling for the mdnav TUI.
//!
//! This module maps key events to commands, depending on the input mode:
//! Normal navigation, the Search picker, and the Help overlay.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::scanner::Mode;

/// The current input mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode for browsing the tree.
    Normal,
    /// Fuzzy picker overlay is open.
    Search,
    /// Help overlay showing all keyboard shortcuts.
    Help,
}

/// Commands that can be issued by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move selection up.
    MoveUp,
    /// Move selection down.
    MoveDown,
    /// Toggle the selected folder or open the selected file.
    Enter,
    /// Collapse the selected folder or jump to its parent.
    Back,
    /// Jump to the first item.
    GotoTop,
    /// Jump to the last item.
    GotoBottom,
    /// Page up navigation.
    PageUp,
    /// Page down navigation.
    PageDown,
    /// Rebuild the tree.
    Refresh,
    /// Switch to a specific discovery mode.
    SetMode(Mode),
    /// Switch to the other discovery mode.
    ToggleMode,
    /// Open the fuzzy picker.
    StartSearch,
    /// Add a character to the picker query.
    SearchInput(char),
    /// Remove the last character from the picker query.
    SearchBackspace,
    /// Open the selected picker entry.
    ConfirmSearch,
    /// Close the picker without opening anything.
    ExitSearch,
    /// Copy the path of the selected item to clipboard.
    CopyPath,
    /// Show help screen.
    ShowHelp,
    /// Hide help screen.
    HideHelp,
    /// Quit the application.
    Quit,
    /// No operation - key was not recognized or not applicable.
    Noop,
}

/// Handle a key event and return the corresponding command.
///
/// The behavior depends on the current input mode:
/// - `Normal`: Full navigation and action commands
/// - `Search`: Query editing and result selection
/// - `Help`: Any key closes the overlay
pub fn handle_key(key: KeyEvent, mode: InputMode) -> Command {
    match mode {
        InputMode::Normal => handle_normal_mode(key),
        InputMode::Search => handle_search_mode(key),
        InputMode::Help => Command::HideHelp,
    }
}

/// Handle key events in Normal mode.
fn handle_normal_mode(key: KeyEvent) -> Command {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('p') if ctrl => Command::StartSearch,
        KeyCode::Char('u') if ctrl => Command::PageUp,
        KeyCode::Char('d') if ctrl => Command::PageDown,
        KeyCode::Char('c') if ctrl => Command::Quit,

        // Navigation
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => Command::Back,
        KeyCode::Char('j') | KeyCode::Down => Command::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Command::MoveUp,
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => Command::Enter,
        KeyCode::PageUp => Command::PageUp,
        KeyCode::PageDown => Command::PageDown,
        KeyCode::Char('g') | KeyCode::Home => Command::GotoTop,
        KeyCode::Char('G') | KeyCode::End => Command::GotoBottom,

        // Tree
        KeyCode::Char('r') | KeyCode::F(5) => Command::Refresh,
        KeyCode::Char('1') => Command::SetMode(Mode::ReadmeOnly),
        KeyCode::Char('2') => Command::SetMode(Mode::AllMarkdown),
        KeyCode::Char('m') | KeyCode::Tab => Command::ToggleMode,

        // Actions
        KeyCode::Char('/') => Command::StartSearch,
        KeyCode::Char('c') => Command::CopyPath,
        KeyCode::Char('?') => Command::ShowHelp,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,

        _ => Command::Noop,
    }
}

/// Handle key events in Search mode. Letters always go to the query.
fn handle_search_mode(key: KeyEvent) -> Command {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('n') if ctrl => Command::MoveDown,
        KeyCode::Char('p') if ctrl => Command::MoveUp,
        KeyCode::Char('c') if ctrl => Command::ExitSearch,

        KeyCode::Esc => Command::ExitSearch,
        KeyCode::Enter => Command::ConfirmSearch,
        KeyCode::Backspace => Command::SearchBackspace,
        KeyCode::Down => Command::MoveDown,
        KeyCode::Up => Command::MoveUp,

        KeyCode::Char(c) if !c.is_control() => Command::SearchInput(c),

        _ => Command::Noop,
    }
}
