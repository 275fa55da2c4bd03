use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::tree::{Folder, TreeNode, SEPARATOR};

/// Represents a node in the exported tree structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportNode {
    pub name: String,
    /// Root-relative path; empty for the root itself
    pub path: String,
    pub is_dir: bool,
    /// Physical path, files only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<ExportNode>,
}

/// One entry of the flattened export
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportEntry {
    pub path: String,
    pub file: String,
}

/// Options for customizing the JSON export
pub struct ExportOptions {
    /// If true, export the flattened `[{path, file}]` list instead of the tree
    pub flat: bool,
}

/// Recursively convert a folder into an ExportNode, children in display order
pub fn folder_to_export_node(name: &str, path: &str, folder: &Folder) -> ExportNode {
    let children = folder
        .sorted_children()
        .into_iter()
        .map(|(child_name, node)| {
            let child_path = if path.is_empty() {
                child_name.to_string()
            } else {
                format!("{}{}{}", path, SEPARATOR, child_name)
            };

            match node {
                TreeNode::Folder(child) => folder_to_export_node(child_name, &child_path, child),
                TreeNode::File(handle) => ExportNode {
                    name: child_name.to_string(),
                    path: child_path,
                    is_dir: false,
                    file: Some(handle.path().to_string_lossy().to_string()),
                    children: Vec::new(),
                },
            }
        })
        .collect();

    ExportNode {
        name: name.to_string(),
        path: path.to_string(),
        is_dir: true,
        file: None,
        children,
    }
}

/// Export the virtual tree to JSON format
///
/// # Arguments
/// * `root_name` - Display name of the workspace root
/// * `tree` - The virtual tree to export
/// * `options` - Export options (flat list or nested tree)
/// * `writer` - Output writer for the JSON
pub fn export_json(
    root_name: &str,
    tree: &Folder,
    options: &ExportOptions,
    writer: &mut impl Write,
) -> Result<(), std::io::Error> {
    let result = if options.flat {
        let entries: Vec<ExportEntry> = tree
            .flatten()
            .into_iter()
            .map(|(path, handle)| ExportEntry {
                path,
                file: handle.path().to_string_lossy().to_string(),
            })
            .collect();
        serde_json::to_writer_pretty(writer, &entries)
    } else {
        serde_json::to_writer_pretty(writer, &folder_to_export_node(root_name, "", tree))
    };

    result.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}
