use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use tracing::{debug, info, warn};

use crate::opener::FileOpener;
use crate::picker::PickerState;
use crate::provider::{
    ProviderEvent, ScanState, TreeItem, TreeProvider, NO_ROOT_MESSAGE, SEARCH_WAIT_MESSAGE,
};
use crate::scanner::Mode;
use crate::ui::{ColorScheme, Command, InputMode, TreeViewState, VisibleRow};

/// Severity of a status bar message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Message shown in the status bar until the next one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// Application state
pub struct App {
    // Core data
    provider: TreeProvider,
    events: Receiver<ProviderEvent>,
    opener: Box<dyn FileOpener>,

    // View state
    pub rows: Vec<VisibleRow>,
    pub tree_state: TreeViewState,
    /// Rows that fit in the tree panel, updated on every render
    pub viewport_height: usize,

    // UI state
    pub color_scheme: ColorScheme,
    pub ascii: bool,
    pub input_mode: InputMode,
    pub picker: Option<PickerState>,
    pending_search: bool,
    pub status: Option<StatusMessage>,
    /// Selection to restore once a rescan replaces the placeholder row
    restore_key: Option<String>,

    // Animation
    spinner_frame: usize,

    pub should_quit: bool,
}

impl App {
    pub fn new(mut provider: TreeProvider, opener: Box<dyn FileOpener>, color_scheme: ColorScheme) -> Self {
        let events = provider.subscribe();
        let mut app = Self {
            provider,
            events,
            opener,
            rows: Vec::new(),
            tree_state: TreeViewState::new(),
            viewport_height: 20,
            color_scheme,
            ascii: false,
            input_mode: InputMode::Normal,
            picker: None,
            pending_search: false,
            status: None,
            restore_key: None,
            spinner_frame: 0,
            should_quit: false,
        };
        // Requesting the root rows kicks off the first scan
        app.refresh_visible_rows();
        app
    }

    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    pub fn provider(&self) -> &TreeProvider {
        &self.provider
    }

    /// Drain scan results and provider events. Called once per frame.
    pub fn update(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.provider.poll();

        let mut dirty = false;
        let events: Vec<ProviderEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                ProviderEvent::DataChanged => dirty = true,
                ProviderEvent::ModeChanged(mode) => {
                    self.set_status(StatusKind::Info, format!("Showing {}", mode.display_name()));
                }
                ProviderEvent::Info(message) => self.set_status(StatusKind::Info, message),
                ProviderEvent::ScanFailed(message) => {
                    self.set_status(StatusKind::Error, format!("Scan failed: {}", message));
                }
            }
        }

        if dirty {
            self.refresh_visible_rows();
        }

        if self.pending_search && self.provider.scan_state() == ScanState::Complete {
            self.pending_search = false;
            self.open_picker();
        }
    }

    /// Handle a command from input
    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Quit => {
                if self.input_mode == InputMode::Normal {
                    self.should_quit = true;
                }
            }
            Command::MoveUp => {
                if self.input_mode == InputMode::Search {
                    if let Some(picker) = self.picker.as_mut() {
                        picker.select_previous();
                    }
                } else {
                    self.tree_state.select_previous();
                    self.ensure_visible();
                }
            }
            Command::MoveDown => {
                if self.input_mode == InputMode::Search {
                    if let Some(picker) = self.picker.as_mut() {
                        picker.select_next();
                    }
                } else {
                    self.tree_state.select_next(self.last_index());
                    self.ensure_visible();
                }
            }
            Command::GotoTop => self.tree_state.select_first(),
            Command::GotoBottom => {
                self.tree_state.select_last(self.last_index());
                self.ensure_visible();
            }
            Command::PageUp => {
                let page = self.viewport_height.max(1);
                self.tree_state.selected_index = self.tree_state.selected_index.saturating_sub(page);
                self.ensure_visible();
            }
            Command::PageDown => {
                let page = self.viewport_height.max(1);
                self.tree_state.selected_index =
                    (self.tree_state.selected_index + page).min(self.last_index());
                self.ensure_visible();
            }
            Command::Enter => self.activate_selected(),
            Command::Back => self.collapse_or_parent(),
            Command::Refresh => {
                info!("refresh requested");
                self.provider.refresh();
            }
            Command::SetMode(mode) => self.provider.set_mode(mode),
            Command::ToggleMode => {
                let mode = self.provider.mode().toggle();
                self.provider.set_mode(mode);
            }
            Command::StartSearch => self.start_search(),
            Command::SearchInput(c) => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.push_char(c);
                }
            }
            Command::SearchBackspace => {
                if let Some(picker) = self.picker.as_mut() {
                    picker.backspace();
                }
            }
            Command::ConfirmSearch => {
                let chosen = self.picker.take().and_then(|p| p.selected().cloned());
                self.input_mode = InputMode::Normal;
                match chosen {
                    Some(item) => {
                        self.opener.open(&item.handle);
                        self.set_status(StatusKind::Info, format!("Opened {}", item.label));
                    }
                    None => debug!("picker confirmed without a selection"),
                }
            }
            Command::ExitSearch => {
                self.picker = None;
                self.pending_search = false;
                self.input_mode = InputMode::Normal;
            }
            Command::CopyPath => self.copy_selected_path(),
            Command::ShowHelp => self.input_mode = InputMode::Help,
            Command::HideHelp => self.input_mode = InputMode::Normal,
            Command::Noop => {}
        }
    }

    pub fn selected_row(&self) -> Option<&VisibleRow> {
        self.rows.get(self.tree_state.selected_index)
    }

    /// Whether a search is waiting for the current scan to finish.
    pub fn is_search_pending(&self) -> bool {
        self.pending_search
    }

    /// Rebuild the visible rows from the provider, keeping the selection on
    /// the same item when it still exists.
    pub fn refresh_visible_rows(&mut self) {
        let selected_key = self
            .selected_row()
            .filter(|row| row.item != TreeItem::Loading)
            .map(|row| row.key().to_string())
            .or_else(|| self.restore_key.take());

        let mut rows = Vec::new();
        collect_rows(&mut self.provider, &self.tree_state, None, 0, &mut rows);
        self.rows = rows;

        if matches!(self.rows.as_slice(), [row] if row.item == TreeItem::Loading) {
            self.restore_key = selected_key;
            self.tree_state.select_first();
            return;
        }

        let restored = selected_key.and_then(|key| self.rows.iter().position(|row| row.key() == key));
        self.tree_state.selected_index = match restored {
            Some(index) => index,
            None => self.tree_state.selected_index.min(self.last_index()),
        };
        self.ensure_visible();
    }

    /// Text for the tree panel when there are no rows.
    pub fn empty_message(&self) -> String {
        if self.provider.root().is_none() {
            NO_ROOT_MESSAGE.to_string()
        } else if let Some(error) = self.provider.last_error() {
            format!("Scan failed: {}", error)
        } else {
            match self.provider.mode() {
                Mode::ReadmeOnly => "No README.md files found.".to_string(),
                Mode::AllMarkdown => "No Markdown files found.".to_string(),
            }
        }
    }

    /// Get spinner character for current frame
    pub fn spinner_char(&self) -> char {
        const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        SPINNER[self.spinner_frame % SPINNER.len()]
    }

    fn last_index(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    fn ensure_visible(&mut self) {
        self.tree_state.ensure_visible(self.viewport_height);
    }

    fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some(StatusMessage { text, kind });
    }

    fn activate_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };

        match &row.item {
            TreeItem::Folder { path, .. } => {
                let path = path.clone();
                self.tree_state.toggle_expand(&path);
                self.refresh_visible_rows();
            }
            TreeItem::File { handle, .. } => {
                let handle = handle.clone();
                self.opener.open(&handle);
                self.set_status(StatusKind::Info, format!("Opened {}", handle.relative()));
            }
            TreeItem::Loading => {}
        }
    }

    fn collapse_or_parent(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };

        if row.item.is_folder() && row.expanded {
            let path = row.key().to_string();
            self.tree_state.collapse(&path);
            self.refresh_visible_rows();
            return;
        }

        let Some((parent, _)) = row.key().rsplit_once('/') else {
            return;
        };
        let parent = parent.to_string();
        if let Some(index) = self
            .rows
            .iter()
            .position(|r| r.item.is_folder() && r.key() == parent)
        {
            self.tree_state.selected_index = index;
            self.ensure_visible();
        }
    }

    fn start_search(&mut self) {
        match self.provider.scan_state() {
            ScanState::Complete => self.open_picker(),
            state => {
                if state == ScanState::Idle {
                    self.provider.ensure_scan();
                }
                self.set_status(StatusKind::Info, SEARCH_WAIT_MESSAGE.to_string());
                self.pending_search = true;
            }
        }
    }

    fn open_picker(&mut self) {
        let items = self.provider.search_items();
        debug!(count = items.len(), "opening picker");
        self.picker = Some(PickerState::new(items));
        self.input_mode = InputMode::Search;
    }

    /// Physical path of the selected row.
    fn selected_path(&self) -> Option<PathBuf> {
        let row = self.selected_row()?;
        match &row.item {
            TreeItem::Folder { path, .. } => self.provider.root().map(|root| root.join(path)),
            item => item.tooltip().map(|path| path.to_path_buf()),
        }
    }

    /// Copy selected path to clipboard
    fn copy_selected_path(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        let path_str = path.to_string_lossy().to_string();

        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(path_str.clone()));
        match copied {
            Ok(()) => self.set_status(StatusKind::Info, format!("Copied {}", path_str)),
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.set_status(StatusKind::Error, format!("Clipboard unavailable. Path: {}", path_str));
            }
        }
    }
}

/// Depth-first walk of the expanded part of the tree.
fn collect_rows(
    provider: &mut TreeProvider,
    state: &TreeViewState,
    parent: Option<&str>,
    depth: usize,
    out: &mut Vec<VisibleRow>,
) {
    for item in provider.children(parent) {
        let open = match &item {
            TreeItem::Folder { path, .. } => state.is_expanded(path),
            _ => false,
        };
        let child_path = match (&item, open) {
            (TreeItem::Folder { path, .. }, true) => Some(path.clone()),
            _ => None,
        };

        out.push(VisibleRow {
            item,
            depth,
            expanded: open,
        });

        if let Some(path) = child_path {
            collect_rows(provider, state, Some(&path), depth + 1, out);
        }
    }
}
