//! Messages sent from a background scan back to the owning thread.

use crate::tree::Folder;

use super::ScanError;

/// Outcome of one scan, tagged with the generation that started it.
#[derive(Debug)]
pub enum ScanProgress {
    /// Discovery finished and the virtual tree was built
    Completed {
        /// Generation of the scan that produced this tree
        generation: u64,
        /// The freshly built virtual tree
        tree: Folder,
        /// Number of files in the tree
        file_count: usize,
    },

    /// Discovery failed; the tree for this generation is empty
    Failed {
        /// Generation of the failed scan
        generation: u64,
        /// What went wrong
        error: ScanError,
    },
}

impl ScanProgress {
    pub fn generation(&self) -> u64 {
        match self {
            ScanProgress::Completed { generation, .. } | ScanProgress::Failed { generation, .. } => {
                *generation
            }
        }
    }
}
