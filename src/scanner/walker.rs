//! Directory walker implementation using walkdir and globset.

use std::path::{Component, Path};
use std::sync::atomic::{AtomicBool, Ordering};

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::tree::{FileHandle, SEPARATOR};

use super::{Mode, ScanError};

/// Dependency-manager and version-control directories that are never scanned.
pub const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules/**", "**/.git/**"];

/// Source of file handles for a scan.
///
/// Implementations run on a background thread and should poll `cancel`
/// between entries, bailing out with [`ScanError::Interrupted`] once it is set.
pub trait Discover: Send + Sync {
    fn find(&self, root: &Path, mode: Mode, cancel: &AtomicBool) -> Result<Vec<FileHandle>, ScanError>;
}

/// Configuration options for discovery.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Maximum depth to traverse (None for unlimited)
    pub max_depth: Option<usize>,
    /// Extra glob patterns to exclude, on top of [`DEFAULT_EXCLUDES`]
    pub exclude_patterns: Vec<String>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set exclude patterns
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }
}

/// Walks the filesystem and returns the Markdown files selected by a [`Mode`].
pub struct Scanner {
    options: ScanOptions,
    excludes: GlobSet,
}

impl Scanner {
    /// Create a scanner, compiling its exclude globs.
    pub fn new(options: ScanOptions) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        let patterns = DEFAULT_EXCLUDES
            .iter()
            .map(|p| p.to_string())
            .chain(options.exclude_patterns.iter().cloned());

        for pattern in patterns {
            let glob = Glob::new(&pattern).map_err(|source| ScanError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }

        let excludes = builder.build().map_err(|source| ScanError::InvalidPattern {
            pattern: options.exclude_patterns.join(","),
            source,
        })?;

        Ok(Self { options, excludes })
    }

    fn include_set(mode: Mode) -> Result<GlobSet, ScanError> {
        let pattern = mode.include_glob();
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(mode.case_insensitive())
            .literal_separator(true)
            .build()
            .map_err(|source| ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        builder.build().map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
    }

    /// Check if a root-relative path is excluded. Directories are tested with
    /// a trailing separator so that `dir/**` style globs prune the directory
    /// itself.
    fn is_excluded(&self, relative: &str, is_dir: bool) -> bool {
        if relative.is_empty() {
            return false;
        }
        if is_dir {
            self.excludes.is_match(format!("{}{}", relative, SEPARATOR))
        } else {
            self.excludes.is_match(relative)
        }
    }
}

impl Discover for Scanner {
    fn find(&self, root: &Path, mode: Mode, cancel: &AtomicBool) -> Result<Vec<FileHandle>, ScanError> {
        let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ScanError::PathNotFound {
                path: root.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied {
                path: root.to_path_buf(),
            },
            _ => ScanError::IoError {
                path: root.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let includes = Self::include_set(mode)?;

        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(max_depth) = self.options.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let mut found = Vec::new();
        let entries = walker
            .into_iter()
            .filter_entry(|e| !self.is_excluded(&to_relative(root, e.path()), e.file_type().is_dir()));

        for entry in entries {
            if cancel.load(Ordering::Relaxed) {
                return Err(ScanError::Interrupted);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Unreadable entries below the root are skipped
                    debug!(path = ?err.path(), error = %err, "skipping entry");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let relative = to_relative(root, entry.path());
            if includes.is_match(&relative) {
                found.push(FileHandle::new(relative, entry.path().to_path_buf()));
            }
        }

        Ok(found)
    }
}

/// Path of `path` relative to `root`, with every separator normalised to `/`.
pub fn to_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    segments.join(&SEPARATOR.to_string()).replace('\\', "/")
}
