//! The path tree builder and cache behind the navigator.
//!
//! [`TreeProvider`] owns the virtual tree for one workspace root. Scans run on
//! a detached thread and report back over a channel; [`TreeProvider::poll`]
//! installs finished results on the owning thread, so the tree is only ever
//! mutated in one place. Every scan is tagged with a generation: refreshing or
//! switching mode bumps the generation the provider is waiting for, and
//! results from older generations are dropped on arrival.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::opener::FileOpener;
use crate::picker::{Picker, SearchItem};
use crate::scanner::{Discover, Mode, ScanError, ScanProgress};
use crate::tree::{FileHandle, Folder, TreeNode, SEPARATOR};

/// Label of the placeholder row shown while a scan is running.
pub const LOADING_LABEL: &str = "Searching for .md files...";

/// Shown whenever the tree is requested without a workspace root.
pub const NO_ROOT_MESSAGE: &str = "Open a project folder to find markdown files.";

/// Shown when a search has to wait for a scan to finish.
pub const SEARCH_WAIT_MESSAGE: &str = "Loading files, please wait a moment...";

/// Where the provider is in its scan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Nothing scanned since the last invalidation
    Idle,
    /// A scan is running; only its result will be accepted
    InFlight { generation: u64 },
    /// The tree reflects the latest scan
    Complete,
}

/// Notifications published to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The displayed tree is stale; re-read everything from the root
    DataChanged,
    /// The discovery mode changed
    ModeChanged(Mode),
    /// Informational message for the user
    Info(String),
    /// A scan failed; the tree is empty until the next refresh
    ScanFailed(String),
}

/// Presentation hint for file rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Readme,
    Markdown,
}

/// A row handed to the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem {
    /// Transient placeholder while the first scan runs
    Loading,
    /// A folder; `path` is the key for requesting its children
    Folder { name: String, path: String },
    /// A Markdown file
    File {
        name: String,
        handle: FileHandle,
        kind: FileKind,
    },
}

impl TreeItem {
    pub fn label(&self) -> &str {
        match self {
            TreeItem::Loading => LOADING_LABEL,
            TreeItem::Folder { name, .. } | TreeItem::File { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeItem::Folder { .. })
    }

    /// Physical path of a file row, used as its tooltip.
    pub fn tooltip(&self) -> Option<&Path> {
        match self {
            TreeItem::File { handle, .. } => Some(handle.path()),
            _ => None,
        }
    }
}

/// Builds, caches and serves the virtual tree for one workspace root.
pub struct TreeProvider {
    root: Option<PathBuf>,
    mode: Mode,
    tree: Folder,
    state: ScanState,
    generation: u64,
    cancel: Option<Arc<AtomicBool>>,
    discovery: Arc<dyn Discover>,
    results_tx: Sender<ScanProgress>,
    results_rx: Receiver<ScanProgress>,
    listeners: Vec<Sender<ProviderEvent>>,
    last_error: Option<String>,
}

impl TreeProvider {
    /// Create a provider. A `None` root is permanent for this instance.
    pub fn new(root: Option<PathBuf>, discovery: Arc<dyn Discover>) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            root,
            mode: Mode::default(),
            tree: Folder::new(),
            state: ScanState::Idle,
            generation: 0,
            cancel: None,
            discovery,
            results_tx,
            results_rx,
            listeners: Vec::new(),
            last_error: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Register a listener. Every listener receives every later event.
    pub fn subscribe(&mut self) -> Receiver<ProviderEvent> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scan_state(&self) -> ScanState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ScanState::InFlight { .. })
    }

    /// The current virtual tree. Empty until a scan completes.
    pub fn tree(&self) -> &Folder {
        &self.tree
    }

    pub fn file_count(&self) -> usize {
        self.tree.file_count()
    }

    /// Message of the last failed scan, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch discovery mode and invalidate the tree.
    pub fn set_mode(&mut self, mode: Mode) {
        info!(mode = %mode, "mode changed");
        self.mode = mode;
        self.emit(ProviderEvent::ModeChanged(mode));
        self.refresh();
    }

    /// Invalidate the tree without changing mode.
    pub fn refresh(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        self.state = ScanState::Idle;
        self.emit(ProviderEvent::DataChanged);
    }

    /// Children of the root (`None`) or of the folder at `parent`.
    ///
    /// Requesting the root while nothing is scanned starts a scan and returns a
    /// single [`TreeItem::Loading`] placeholder; the real rows follow with a
    /// [`ProviderEvent::DataChanged`] once [`poll`](Self::poll) settles the
    /// result. Folder children are served from the built tree without I/O.
    pub fn children(&mut self, parent: Option<&str>) -> Vec<TreeItem> {
        if let Some(path) = parent {
            return self
                .tree
                .folder_at(path)
                .map(|folder| items_of(folder, path))
                .unwrap_or_default();
        }

        if self.root.is_none() {
            self.emit(ProviderEvent::Info(NO_ROOT_MESSAGE.to_string()));
            return Vec::new();
        }

        match self.state {
            ScanState::Idle => {
                self.start_scan();
                vec![TreeItem::Loading]
            }
            ScanState::InFlight { .. } => vec![TreeItem::Loading],
            ScanState::Complete => items_of(&self.tree, ""),
        }
    }

    /// Settle any finished scans. Returns true if the tree was replaced.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(progress) = self.results_rx.try_recv() {
            changed |= self.settle(progress);
        }
        changed
    }

    /// Launch a scan unless one is in flight or already complete.
    pub fn ensure_scan(&mut self) {
        if self.state == ScanState::Idle {
            self.start_scan();
        }
    }

    /// Make sure a scan has been launched and block until the tree is built.
    pub fn wait_for_scan(&mut self) {
        self.ensure_scan();

        while let ScanState::InFlight { .. } = self.state {
            match self.results_rx.recv() {
                Ok(progress) => {
                    self.settle(progress);
                }
                Err(_) => break,
            }
        }
    }

    /// Every file of the tree as a picker entry.
    pub fn search_items(&self) -> Vec<SearchItem> {
        self.tree
            .flatten()
            .into_iter()
            .map(|(label, handle)| SearchItem::new(label, handle))
            .collect()
    }

    /// Wait for a scan if needed, let `picker` choose a file and open it.
    ///
    /// Returns the opened file, or `None` when the picker was cancelled.
    pub fn search<P, O>(&mut self, picker: &mut P, opener: &O) -> Option<FileHandle>
    where
        P: Picker + ?Sized,
        O: FileOpener + ?Sized,
    {
        if self.state == ScanState::Idle {
            self.emit(ProviderEvent::Info(SEARCH_WAIT_MESSAGE.to_string()));
        }
        self.wait_for_scan();

        match picker.pick(self.search_items()) {
            Some(item) => {
                opener.open(&item.handle);
                Some(item.handle)
            }
            None => {
                debug!("picker cancelled");
                None
            }
        }
    }

    fn start_scan(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.tree = Folder::new();

        let Some(root) = self.root.clone() else {
            self.emit(ProviderEvent::Info(NO_ROOT_MESSAGE.to_string()));
            self.state = ScanState::Complete;
            return;
        };

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));
        self.state = ScanState::InFlight { generation };

        let discovery = Arc::clone(&self.discovery);
        let tx = self.results_tx.clone();
        let mode = self.mode;

        info!(generation, mode = %mode, root = %root.display(), "starting scan");

        thread::spawn(move || {
            let started = Instant::now();
            let found = panic::catch_unwind(AssertUnwindSafe(|| discovery.find(&root, mode, &cancel)))
                .unwrap_or_else(|payload| Err(panic_error(payload)));
            let progress = match found {
                Ok(handles) => {
                    let tree = Folder::from_handles(handles);
                    let file_count = tree.file_count();
                    debug!(generation, file_count, elapsed = ?started.elapsed(), "scan finished");
                    ScanProgress::Completed {
                        generation,
                        tree,
                        file_count,
                    }
                }
                Err(error) => ScanProgress::Failed { generation, error },
            };

            // The provider may be gone by now
            let _ = tx.send(progress);
        });
    }

    fn settle(&mut self, progress: ScanProgress) -> bool {
        let current = match self.state {
            ScanState::InFlight { generation } => generation,
            _ => {
                debug!(generation = progress.generation(), "dropping result, no scan pending");
                return false;
            }
        };

        if progress.generation() != current {
            debug!(
                generation = progress.generation(),
                current, "dropping stale scan result"
            );
            return false;
        }

        self.cancel = None;
        self.state = ScanState::Complete;

        match progress {
            ScanProgress::Completed {
                tree, file_count, ..
            } => {
                info!(generation = current, file_count, "tree rebuilt");
                self.tree = tree;
                self.last_error = None;
            }
            ScanProgress::Failed { error, .. } => {
                warn!(generation = current, error = %error, "scan failed");
                self.tree = Folder::new();
                let message = error.to_string();
                self.last_error = Some(message.clone());
                self.emit(ProviderEvent::ScanFailed(message));
            }
        }

        self.emit(ProviderEvent::DataChanged);
        true
    }

    fn emit(&mut self, event: ProviderEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn panic_error(payload: Box<dyn std::any::Any + Send>) -> ScanError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ScanError::Panicked { message }
}

/// Display rows for the children of `folder`, whose own path is `prefix`.
fn items_of(folder: &Folder, prefix: &str) -> Vec<TreeItem> {
    folder
        .sorted_children()
        .into_iter()
        .map(|(name, node)| match node {
            TreeNode::Folder(_) => TreeItem::Folder {
                name: name.to_string(),
                path: if prefix.is_empty() {
                    name.to_string()
                } else {
                    format!("{}{}{}", prefix, SEPARATOR, name)
                },
            },
            TreeNode::File(handle) => TreeItem::File {
                name: name.to_string(),
                handle: handle.clone(),
                kind: if handle.is_readme() {
                    FileKind::Readme
                } else {
                    FileKind::Markdown
                },
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ScanError, ScanOptions, Scanner};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    const README_FILES: &[&str] = &["README.md", "docs/README.md"];
    const ALL_FILES: &[&str] = &["README.md", "docs/README.md", "docs/guide.md"];

    fn handles(paths: &[&str]) -> Vec<FileHandle> {
        paths
            .iter()
            .map(|p| FileHandle::new(*p, PathBuf::from("/ws").join(p)))
            .collect()
    }

    fn files_for(mode: Mode) -> Vec<FileHandle> {
        match mode {
            Mode::ReadmeOnly => handles(README_FILES),
            Mode::AllMarkdown => handles(ALL_FILES),
        }
    }

    /// Answers immediately from a fixed file list.
    struct FixedDiscovery;

    impl Discover for FixedDiscovery {
        fn find(&self, _root: &Path, mode: Mode, _cancel: &AtomicBool) -> Result<Vec<FileHandle>, ScanError> {
            Ok(files_for(mode))
        }
    }

    /// README scans block until the gate is opened; other modes answer at once.
    struct GatedDiscovery {
        gate: Mutex<Receiver<()>>,
    }

    impl Discover for GatedDiscovery {
        fn find(&self, _root: &Path, mode: Mode, _cancel: &AtomicBool) -> Result<Vec<FileHandle>, ScanError> {
            if mode == Mode::ReadmeOnly {
                let _ = self.gate.lock().unwrap().recv();
            }
            Ok(files_for(mode))
        }
    }

    struct EmptyDiscovery;

    impl Discover for EmptyDiscovery {
        fn find(&self, _root: &Path, _mode: Mode, _cancel: &AtomicBool) -> Result<Vec<FileHandle>, ScanError> {
            Ok(Vec::new())
        }
    }

    struct PanickingDiscovery;

    impl Discover for PanickingDiscovery {
        fn find(&self, _root: &Path, _mode: Mode, _cancel: &AtomicBool) -> Result<Vec<FileHandle>, ScanError> {
            panic!("walker exploded")
        }
    }

    struct RecordingPicker {
        offered: Vec<SearchItem>,
        choose: Option<usize>,
    }

    impl Picker for RecordingPicker {
        fn pick(&mut self, items: Vec<SearchItem>) -> Option<SearchItem> {
            self.offered = items.clone();
            self.choose.and_then(|i| items.into_iter().nth(i))
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<FileHandle>>,
    }

    impl FileOpener for RecordingOpener {
        fn open(&self, handle: &FileHandle) {
            self.opened.borrow_mut().push(handle.clone());
        }
    }

    fn provider(discovery: Arc<dyn Discover>) -> TreeProvider {
        TreeProvider::new(Some(PathBuf::from("/ws")), discovery)
    }

    fn labels(items: &[TreeItem]) -> Vec<&str> {
        items.iter().map(TreeItem::label).collect()
    }

    fn flattened(provider: &TreeProvider) -> HashSet<String> {
        provider
            .tree()
            .flatten()
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    fn drain(rx: &Receiver<ProviderEvent>) -> Vec<ProviderEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_first_request_returns_placeholder() {
        let mut provider = provider(Arc::new(FixedDiscovery));
        let events = provider.subscribe();

        let items = provider.children(None);
        assert_eq!(items, vec![TreeItem::Loading]);
        assert!(provider.is_loading());

        provider.wait_for_scan();
        assert_eq!(provider.scan_state(), ScanState::Complete);
        assert!(drain(&events).contains(&ProviderEvent::DataChanged));

        let items = provider.children(None);
        assert_eq!(labels(&items), vec!["docs", "README.md"]);
    }

    #[test]
    fn test_poll_settles_background_scan() {
        let mut provider = provider(Arc::new(FixedDiscovery));
        provider.children(None);

        let mut settled = false;
        for _ in 0..200 {
            if provider.poll() {
                settled = true;
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        assert!(settled);
        assert_eq!(provider.file_count(), README_FILES.len());
    }

    #[test]
    fn test_folder_children_are_synchronous() {
        let mut provider = provider(Arc::new(FixedDiscovery)).with_mode(Mode::AllMarkdown);
        provider.wait_for_scan();

        let docs = provider.children(Some("docs"));
        assert_eq!(labels(&docs), vec!["guide.md", "README.md"]);
        assert!(matches!(
            &docs[1],
            TreeItem::File { kind: FileKind::Readme, .. }
        ));
        assert!(matches!(
            &docs[0],
            TreeItem::File { kind: FileKind::Markdown, .. }
        ));
        assert!(provider.children(Some("missing")).is_empty());
    }

    #[test]
    fn test_folder_item_paths() {
        let discovery = Arc::new(FixedDiscovery);
        let mut provider = provider(discovery).with_mode(Mode::AllMarkdown);
        provider.wait_for_scan();

        let root = provider.children(None);
        assert_eq!(
            root[0],
            TreeItem::Folder {
                name: "docs".to_string(),
                path: "docs".to_string()
            }
        );
    }

    #[test]
    fn test_empty_discovery_yields_empty_root() {
        let mut provider = provider(Arc::new(EmptyDiscovery));
        provider.wait_for_scan();

        assert!(provider.tree().is_empty());
        assert!(provider.children(None).is_empty());
        assert!(provider.last_error().is_none());
    }

    #[test]
    fn test_no_root_reports_info() {
        let mut provider = TreeProvider::new(None, Arc::new(FixedDiscovery));
        let events = provider.subscribe();

        assert!(provider.children(None).is_empty());
        assert_eq!(
            drain(&events),
            vec![ProviderEvent::Info(NO_ROOT_MESSAGE.to_string())]
        );
        assert_eq!(provider.scan_state(), ScanState::Idle);
    }

    #[test]
    fn test_set_mode_publishes_and_invalidates() {
        let mut provider = provider(Arc::new(FixedDiscovery));
        provider.wait_for_scan();
        let events = provider.subscribe();

        provider.set_mode(Mode::AllMarkdown);

        assert_eq!(provider.mode(), Mode::AllMarkdown);
        assert_eq!(provider.scan_state(), ScanState::Idle);
        assert_eq!(
            drain(&events),
            vec![
                ProviderEvent::ModeChanged(Mode::AllMarkdown),
                ProviderEvent::DataChanged
            ]
        );

        assert_eq!(provider.children(None), vec![TreeItem::Loading]);
        provider.wait_for_scan();
        assert_eq!(provider.file_count(), ALL_FILES.len());
    }

    #[test]
    fn test_mode_switch_discards_outstanding_scan() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let discovery = Arc::new(GatedDiscovery {
            gate: Mutex::new(gate_rx),
        });
        let mut provider = provider(discovery);

        // README scan is stuck behind the gate
        assert_eq!(provider.children(None), vec![TreeItem::Loading]);

        provider.set_mode(Mode::AllMarkdown);
        assert_eq!(provider.children(None), vec![TreeItem::Loading]);
        provider.wait_for_scan();

        let expected: HashSet<String> = ALL_FILES.iter().map(|s| s.to_string()).collect();
        assert_eq!(flattened(&provider), expected);

        // Let the stale README scan finish and make sure it is ignored
        gate_tx.send(()).unwrap();
        for _ in 0..20 {
            assert!(!provider.poll());
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(flattened(&provider), expected);
        assert_eq!(provider.scan_state(), ScanState::Complete);
    }

    #[test]
    fn test_double_refresh_builds_one_complete_tree() {
        let mut provider = provider(Arc::new(FixedDiscovery)).with_mode(Mode::AllMarkdown);
        provider.children(None);

        provider.refresh();
        provider.refresh();
        assert_eq!(provider.children(None), vec![TreeItem::Loading]);
        provider.wait_for_scan();

        for _ in 0..20 {
            provider.poll();
            thread::sleep(Duration::from_millis(2));
        }

        let expected: HashSet<String> = ALL_FILES.iter().map(|s| s.to_string()).collect();
        assert_eq!(flattened(&provider), expected);
        assert_eq!(provider.file_count(), ALL_FILES.len());
    }

    #[test]
    fn test_search_waits_then_offers_flattened_set() {
        let mut provider = provider(Arc::new(FixedDiscovery)).with_mode(Mode::AllMarkdown);
        let events = provider.subscribe();
        let mut picker = RecordingPicker {
            offered: Vec::new(),
            choose: None,
        };
        let opener = RecordingOpener::default();

        let opened = provider.search(&mut picker, &opener);

        assert!(opened.is_none());
        assert!(opener.opened.borrow().is_empty());
        assert_eq!(provider.scan_state(), ScanState::Complete);

        let offered: HashSet<String> = picker.offered.iter().map(|i| i.label.clone()).collect();
        let expected: HashSet<String> = ALL_FILES.iter().map(|s| s.to_string()).collect();
        assert_eq!(offered, expected);

        let guide = picker
            .offered
            .iter()
            .find(|i| i.label == "docs/guide.md")
            .unwrap();
        assert_eq!(guide.description, "guide.md");

        assert!(drain(&events).contains(&ProviderEvent::Info(SEARCH_WAIT_MESSAGE.to_string())));
    }

    #[test]
    fn test_search_selection_opens_file() {
        let mut provider = provider(Arc::new(FixedDiscovery));
        let mut picker = RecordingPicker {
            offered: Vec::new(),
            choose: Some(0),
        };
        let opener = RecordingOpener::default();

        let opened = provider.search(&mut picker, &opener).unwrap();

        assert_eq!(opener.opened.borrow().as_slice(), &[opened.clone()]);
        assert_eq!(picker.offered[0].handle, opened);
    }

    #[test]
    fn test_scan_failure_is_reported() {
        let scanner = Scanner::new(ScanOptions::new()).unwrap();
        let mut provider = TreeProvider::new(
            Some(PathBuf::from("/nonexistent/path/that/does/not/exist")),
            Arc::new(scanner),
        );
        let events = provider.subscribe();

        provider.wait_for_scan();

        assert!(provider.tree().is_empty());
        assert!(provider.last_error().unwrap().contains("path not found"));
        let events = drain(&events);
        assert!(matches!(events[0], ProviderEvent::ScanFailed(_)));
        assert_eq!(events[1], ProviderEvent::DataChanged);
    }

    #[test]
    fn test_panicking_discovery_fails_the_scan() {
        let mut provider = provider(Arc::new(PanickingDiscovery));
        let events = provider.subscribe();

        provider.wait_for_scan();

        assert_eq!(provider.scan_state(), ScanState::Complete);
        assert!(provider.tree().is_empty());
        assert_eq!(provider.last_error(), Some("discovery panicked: walker exploded"));
        assert!(matches!(drain(&events)[0], ProviderEvent::ScanFailed(_)));

        let mut picker = RecordingPicker {
            offered: Vec::new(),
            choose: Some(0),
        };
        let opener = RecordingOpener::default();
        assert!(provider.search(&mut picker, &opener).is_none());
        assert!(picker.offered.is_empty());
    }

    #[test]
    fn test_readme_and_all_markdown_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("docs")).unwrap();
        std::fs::write(root.join("README.md"), "# root").unwrap();
        std::fs::write(root.join("docs/README.md"), "# docs").unwrap();
        std::fs::write(root.join("docs/guide.md"), "# guide").unwrap();

        let scanner = Scanner::new(ScanOptions::new()).unwrap();
        let mut provider = TreeProvider::new(Some(root.to_path_buf()), Arc::new(scanner));

        provider.wait_for_scan();
        assert_eq!(labels(&provider.children(None)), vec!["docs", "README.md"]);
        assert_eq!(labels(&provider.children(Some("docs"))), vec!["README.md"]);

        provider.set_mode(Mode::AllMarkdown);
        provider.wait_for_scan();
        assert_eq!(labels(&provider.children(None)), vec!["docs", "README.md"]);
        assert_eq!(
            labels(&provider.children(Some("docs"))),
            vec!["guide.md", "README.md"]
        );

        let readme = provider.children(None).pop().unwrap();
        assert_eq!(readme.tooltip(), Some(root.join("README.md").as_path()));
    }
}
