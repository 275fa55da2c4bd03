use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Separator used for every logical (root-relative) path in the tree.
pub const SEPARATOR: char = '/';

/// A discovered Markdown file: its root-relative logical path plus the
/// physical location on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    relative: String,
    path: PathBuf,
}

impl FileHandle {
    pub fn new(relative: impl Into<String>, path: PathBuf) -> Self {
        Self {
            relative: relative.into(),
            path,
        }
    }

    /// Root-relative path, always `/` separated.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Physical path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare file name (last segment of the relative path).
    pub fn file_name(&self) -> &str {
        self.relative
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or(&self.relative)
    }

    pub fn is_readme(&self) -> bool {
        self.file_name().eq_ignore_ascii_case("readme.md")
    }
}

/// A node of the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Folder(Folder),
    File(FileHandle),
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    /// Turn this node into a folder if it is not one already and return it.
    fn make_folder(&mut self) -> &mut Folder {
        if !self.is_folder() {
            *self = TreeNode::Folder(Folder::new());
        }
        match self {
            TreeNode::Folder(folder) => folder,
            TreeNode::File(_) => unreachable!("node was replaced by a folder above"),
        }
    }
}

/// A synthesized folder. Folders only exist while some descendant file does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    children: BTreeMap<String, TreeNode>,
}

impl Folder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a flat list of file handles into a tree.
    pub fn from_handles(handles: impl IntoIterator<Item = FileHandle>) -> Self {
        let mut root = Folder::new();
        for handle in handles {
            root.insert(handle);
        }
        root
    }

    /// Insert a file, creating intermediate folders for every non-final
    /// segment of its relative path.
    ///
    /// Segment-role conflicts (a name used both as folder and as file) are not
    /// expected from a real filesystem; the later insert wins.
    pub fn insert(&mut self, handle: FileHandle) {
        let segments: Vec<String> = handle
            .relative()
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let Some((leaf, dirs)) = segments.split_last() else {
            return;
        };

        let mut current: &mut Folder = self;
        for dir in dirs {
            current = current
                .children
                .entry(dir.clone())
                .or_insert_with(|| TreeNode::Folder(Folder::new()))
                .make_folder();
        }
        current.children.insert(leaf.clone(), TreeNode::File(handle));
    }

    /// Total number of files below this folder.
    pub fn file_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                TreeNode::Folder(folder) => folder.file_count(),
                TreeNode::File(_) => 1,
            })
            .sum()
    }

    /// Resolve a `/` separated folder path relative to this folder.
    /// The empty path resolves to `self`.
    pub fn folder_at(&self, path: &str) -> Option<&Folder> {
        let mut current = self;
        for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
            match current.children.get(segment)? {
                TreeNode::Folder(folder) => current = folder,
                TreeNode::File(_) => return None,
            }
        }
        Some(current)
    }

    /// Children in display order: folders first, then files, each group in
    /// locale-aware ascending order by name.
    pub fn sorted_children(&self) -> Vec<(&str, &TreeNode)> {
        let mut entries: Vec<(&str, &TreeNode)> = self
            .children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
            .collect();

        entries.sort_by(|(a_name, a), (b_name, b)| {
            b.is_folder()
                .cmp(&a.is_folder())
                .then_with(|| locale_compare(a_name, b_name))
        });

        entries
    }

    /// Depth-first list of `(full relative path, handle)` pairs.
    pub fn flatten(&self) -> Vec<(String, FileHandle)> {
        let mut acc = Vec::new();
        flatten_into(self, "", &mut acc);
        acc
    }
}

#[cfg(test)]
impl Folder {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.children.get(name)
    }
}

/// Append every file below `folder` to `acc`, joining names onto `prefix`.
pub fn flatten_into(folder: &Folder, prefix: &str, acc: &mut Vec<(String, FileHandle)>) {
    for (name, node) in &folder.children {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}{}{}", prefix, SEPARATOR, name)
        };

        match node {
            TreeNode::File(handle) => acc.push((path, handle.clone())),
            TreeNode::Folder(child) => flatten_into(child, &path, acc),
        }
    }
}

/// Case-aware, locale-style string ordering.
///
/// Names compare by base letters first, ignoring case and accents, so `é`
/// sorts between `e` and `f`. Ties are broken by accents, then by case
/// (lowercase first), then by code points.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_key(a)
        .cmp(&base_key(b))
        .then_with(|| fold_case(a).cmp(&fold_case(b)))
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn base_key(s: &str) -> Vec<char> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn fold_case(s: &str) -> Vec<char> {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        if x.is_lowercase() && y.is_uppercase() {
            return Ordering::Less;
        }
        if x.is_uppercase() && y.is_lowercase() {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn handle(relative: &str) -> FileHandle {
        FileHandle::new(relative, PathBuf::from("/ws").join(relative))
    }

    fn names(folder: &Folder) -> Vec<&str> {
        folder.sorted_children().into_iter().map(|(n, _)| n).collect()
    }

    #[test]
    fn test_empty_build() {
        let tree = Folder::from_handles(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.flatten().is_empty());
    }

    #[test]
    fn test_nested_folders_created() {
        let tree = Folder::from_handles(vec![handle("a/b/c/README.md")]);

        let a = tree.folder_at("a").unwrap();
        let b = tree.folder_at("a/b").unwrap();
        let c = tree.folder_at("a/b/c").unwrap();

        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert!(matches!(c.get("README.md"), Some(TreeNode::File(_))));
        assert_eq!(tree.file_count(), 1);
    }

    #[test]
    fn test_round_trip_independent_of_order() {
        let paths = [
            "README.md",
            "docs/README.md",
            "docs/guide.md",
            "docs/api/v1.md",
            "crates/core/README.md",
        ];

        let forward: Vec<FileHandle> = paths.iter().map(|p| handle(p)).collect();
        let backward: Vec<FileHandle> = paths.iter().rev().map(|p| handle(p)).collect();

        let expected: HashSet<(String, FileHandle)> = paths
            .iter()
            .map(|p| (p.to_string(), handle(p)))
            .collect();

        let a: HashSet<_> = Folder::from_handles(forward).flatten().into_iter().collect();
        let b: HashSet<_> = Folder::from_handles(backward).flatten().into_iter().collect();

        assert_eq!(a, expected);
        assert_eq!(b, expected);
    }

    #[test]
    fn test_folders_before_files() {
        let tree = Folder::from_handles(vec![
            handle("b.md"),
            handle("A/README.md"),
            handle("a.md"),
        ]);

        assert_eq!(names(&tree), vec!["A", "a.md", "b.md"]);
    }

    #[test]
    fn test_locale_compare() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Zeta", "alpha"), Ordering::Greater);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("readme.md", "README.md"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);

        assert_eq!(locale_compare("éclair.md", "faq.md"), Ordering::Less);
        assert_eq!(locale_compare("eclair.md", "éclair.md"), Ordering::Less);
        assert_eq!(locale_compare("Éclair.md", "eclair.md"), Ordering::Greater);

        let tree = Folder::from_handles(vec![handle("zeta.md"), handle("éclair.md"), handle("faq.md")]);
        assert_eq!(names(&tree), vec!["éclair.md", "faq.md", "zeta.md"]);
    }

    #[test]
    fn test_folder_at_missing_or_file() {
        let tree = Folder::from_handles(vec![handle("docs/guide.md")]);
        assert!(tree.folder_at("").is_some());
        assert!(tree.folder_at("nope").is_none());
        assert!(tree.folder_at("docs/guide.md").is_none());
    }

    #[test]
    fn test_file_handle_names() {
        let h = handle("docs/Readme.MD");
        assert_eq!(h.file_name(), "Readme.MD");
        assert!(h.is_readme());
        assert!(!handle("docs/guide.md").is_readme());
        assert_eq!(handle("top.md").file_name(), "top.md");
    }

    #[test]
    fn test_later_insert_wins_on_conflict() {
        let mut tree = Folder::new();
        tree.insert(handle("x"));
        tree.insert(handle("x/inner.md"));
        assert!(tree.folder_at("x").is_some());
        assert_eq!(tree.file_count(), 1);
    }
}
