//! Opening a chosen file.

use std::io::Write;

use tracing::{info, warn};

use crate::tree::FileHandle;

/// Fire-and-forget file opener. Failures are logged, never returned.
pub trait FileOpener {
    fn open(&self, handle: &FileHandle);
}

/// Opens files with the system's default application.
pub struct SystemOpener;

impl FileOpener for SystemOpener {
    fn open(&self, handle: &FileHandle) {
        match open::that_detached(handle.path()) {
            Ok(()) => info!(path = %handle.path().display(), "opened file"),
            Err(e) => warn!(path = %handle.path().display(), error = %e, "failed to open file"),
        }
    }
}

/// Prints the file's path to stdout instead of opening it.
pub struct PrintOpener;

impl FileOpener for PrintOpener {
    fn open(&self, handle: &FileHandle) {
        let mut stdout = std::io::stdout();
        if let Err(e) = writeln!(stdout, "{}", handle.path().display()) {
            warn!(error = %e, "failed to print path");
        }
    }
}
