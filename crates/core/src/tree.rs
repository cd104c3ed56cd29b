//! Presentation nodes for the module tree.
//!
//! Everything here is a pure read over a [`ModuleMap`]; host front ends turn
//! the nodes into whatever their tree widget needs.

use crate::model::{ModuleFileRecord, ModuleMap, ScanStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const OPEN_FILE_COMMAND: &str = "modulesExplorer.openFile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "command")]
pub enum Action {
    OpenFile { path: PathBuf },
}

impl Action {
    pub fn command_id(&self) -> &'static str {
        match self {
            Action::OpenFile { .. } => OPEN_FILE_COMMAND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TreeNode {
    Module { name: String },
    /// Grouping header for one root folder. Never actionable.
    FolderLabel { name: String },
    File {
        label: String,
        path: PathBuf,
        action: Action,
    },
    /// Empty-state explanation shown instead of modules.
    Message { text: String },
}

impl TreeNode {
    fn file(record: &ModuleFileRecord) -> Self {
        TreeNode::File {
            label: record.label.clone(),
            path: record.file_path.clone(),
            action: Action::OpenFile {
                path: record.file_path.clone(),
            },
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TreeNode::Module { name } | TreeNode::FolderLabel { name } => name,
            TreeNode::File { label, .. } => label,
            TreeNode::Message { text } => text,
        }
    }

    pub fn is_expandable(&self) -> bool {
        matches!(self, TreeNode::Module { .. })
    }

    pub fn action(&self) -> Option<&Action> {
        match self {
            TreeNode::File { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// Text of the single node shown when the map is empty.
pub fn empty_message(status: &ScanStatus) -> String {
    match status {
        ScanStatus::Pending => "Scanning for modules...".to_string(),
        ScanStatus::NoInput => "No workspace folder open. Please open a folder.".to_string(),
        ScanStatus::NoMatches { patterns } => {
            format!("No modules found. Looking for: {}", patterns.join(" or "))
        }
        ScanStatus::Found { .. } => "No modules found.".to_string(),
    }
}

/// Root level: one node per module, sorted by name.
pub fn list_modules(map: &ModuleMap, status: &ScanStatus) -> Vec<TreeNode> {
    if map.is_empty() {
        return vec![TreeNode::Message {
            text: empty_message(status),
        }];
    }

    let mut names: Vec<&String> = map.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| TreeNode::Module { name: name.clone() })
        .collect()
}

/// Second level: for each root folder (sorted), a label followed by its files
/// sorted by label. Unknown modules yield nothing.
pub fn list_entries(map: &ModuleMap, module: &str) -> Vec<TreeNode> {
    let Some(records) = map.get(module) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<&str, Vec<&ModuleFileRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.root_folder.as_str()).or_default().push(record);
    }

    let mut nodes = Vec::with_capacity(records.len() + groups.len());
    for (folder, mut files) in groups {
        nodes.push(TreeNode::FolderLabel {
            name: folder.to_string(),
        });
        files.sort_by(|a, b| a.label.cmp(&b.label));
        nodes.extend(files.into_iter().map(TreeNode::file));
    }
    nodes
}

/// Tree-view contract: roots for `None`, entries for a module, nothing otherwise.
pub fn children(
    map: &ModuleMap,
    status: &ScanStatus,
    parent: Option<&TreeNode>,
) -> Vec<TreeNode> {
    match parent {
        None => list_modules(map, status),
        Some(TreeNode::Module { name }) => list_entries(map, name),
        Some(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(module: &str, label: &str, root_folder: &str) -> ModuleFileRecord {
        ModuleFileRecord {
            module_name: module.to_string(),
            file_path: PathBuf::from(format!("/ws/{}/{}/{}", root_folder, module, label)),
            label: label.to_string(),
            root_folder: root_folder.to_string(),
        }
    }

    #[test]
    fn test_modules_sorted_by_name() {
        let mut map = ModuleMap::new();
        map.insert("b".to_string(), vec![record("b", "x.ts", "apps/web")]);
        map.insert("a".to_string(), vec![record("a", "y.ts", "apps/web")]);

        let nodes = list_modules(&map, &ScanStatus::Pending);
        let labels: Vec<&str> = nodes.iter().map(TreeNode::label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert!(nodes.iter().all(TreeNode::is_expandable));
    }

    #[test]
    fn test_empty_map_yields_single_message() {
        let map = ModuleMap::new();

        let nodes = list_modules(&map, &ScanStatus::NoInput);
        assert_eq!(nodes.len(), 1);
        assert!(!nodes[0].is_expandable());
        assert!(nodes[0].action().is_none());
        assert!(nodes[0].label().contains("No workspace"));

        let status = ScanStatus::NoMatches {
            patterns: vec!["apps/**/src/modules/*".into(), "packages/**/src/modules/*".into()],
        };
        let nodes = list_modules(&map, &status);
        assert_eq!(nodes.len(), 1);
        assert_eq!(
            nodes[0].label(),
            "No modules found. Looking for: apps/**/src/modules/* or packages/**/src/modules/*"
        );
    }

    #[test]
    fn test_entries_grouped_then_sorted() {
        let mut map = ModuleMap::new();
        map.insert(
            "m".to_string(),
            vec![
                record("m", "z.ts", "x"),
                record("m", "b.ts", "packages/core"),
                record("m", "a.ts", "x"),
            ],
        );

        let nodes = list_entries(&map, "m");
        let labels: Vec<&str> = nodes.iter().map(TreeNode::label).collect();
        assert_eq!(labels, vec!["packages/core", "b.ts", "x", "a.ts", "z.ts"]);
        assert!(matches!(nodes[0], TreeNode::FolderLabel { .. }));
        assert!(matches!(nodes[2], TreeNode::FolderLabel { .. }));
    }

    #[test]
    fn test_only_files_carry_open_action() {
        let mut map = ModuleMap::new();
        map.insert("m".to_string(), vec![record("m", "a.ts", "x")]);

        for node in list_entries(&map, "m") {
            match &node {
                TreeNode::FolderLabel { .. } => assert!(node.action().is_none()),
                TreeNode::File { path, .. } => {
                    let action = node.action().expect("file nodes are actionable");
                    assert_eq!(action.command_id(), OPEN_FILE_COMMAND);
                    assert_eq!(action, &Action::OpenFile { path: path.clone() });
                    assert_eq!(path, &PathBuf::from("/ws/x/m/a.ts"));
                }
                other => panic!("unexpected node {:?}", other),
            }
        }
    }

    #[test]
    fn test_unknown_module_has_no_entries() {
        let map = ModuleMap::new();
        assert!(list_entries(&map, "missing").is_empty());
    }

    #[test]
    fn test_children_dispatch() {
        let mut map = ModuleMap::new();
        map.insert("m".to_string(), vec![record("m", "a.ts", "x")]);
        let status = ScanStatus::Found { modules: 1, files: 1 };

        let roots = children(&map, &status, None);
        assert_eq!(roots, vec![TreeNode::Module { name: "m".into() }]);
        assert_eq!(children(&map, &status, Some(&roots[0])).len(), 2);

        let label = TreeNode::FolderLabel { name: "x".into() };
        assert!(children(&map, &status, Some(&label)).is_empty());
    }
}
