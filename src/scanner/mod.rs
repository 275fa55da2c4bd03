//! Scanner module for discovering Markdown files under a workspace root.
//!
//! Discovery walks the root with walkdir, prunes dependency and VCS
//! directories, and keeps the files whose root-relative path matches the
//! active [`Mode`]'s glob.

mod mode;
mod progress;
mod walker;

pub use mode::Mode;
pub use progress::ScanProgress;
pub use walker::{Discover, ScanOptions, Scanner};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering files.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Permission denied when accessing the root
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed
        path: PathBuf,
    },

    /// The workspace root does not exist
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path that was not found
        path: PathBuf,
    },

    /// An I/O error occurred while accessing the root
    #[error("I/O error at {path}: {source}")]
    IoError {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The workspace root is not a directory
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that was expected to be a directory
        path: PathBuf,
    },

    /// An include or exclude glob could not be compiled
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// The underlying glob error
        #[source]
        source: globset::Error,
    },

    /// The scan was cancelled by a newer refresh
    #[error("scan interrupted")]
    Interrupted,

    /// The discovery backend panicked
    #[error("discovery panicked: {message}")]
    Panicked {
        /// The panic payload, when it was a string
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::PermissionDenied {
            path: PathBuf::from("/secret"),
        };
        assert_eq!(err.to_string(), "permission denied: /secret");

        let err = ScanError::PathNotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(err.to_string(), "path not found: /missing");

        let err = ScanError::NotADirectory {
            path: PathBuf::from("/file.md"),
        };
        assert_eq!(err.to_string(), "not a directory: /file.md");

        let err = ScanError::Interrupted;
        assert_eq!(err.to_string(), "scan interrupted");

        let err = ScanError::Panicked {
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "discovery panicked: boom");
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test error");
        let err = ScanError::IoError {
            path: PathBuf::from("/some/path"),
            source: io_err,
        };

        assert!(err.to_string().contains("/some/path"));
        assert!(err.to_string().contains("test error"));
    }

    #[test]
    fn test_invalid_pattern() {
        let source = globset::Glob::new("a[").unwrap_err();
        let err = ScanError::InvalidPattern {
            pattern: "a[".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid glob pattern 'a['"));
    }
}
