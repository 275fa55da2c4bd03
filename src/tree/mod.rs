mod node;

pub use node::{locale_compare, FileHandle, Folder, TreeNode, SEPARATOR};
