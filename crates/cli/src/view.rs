use modex_core::model::{ModuleMap, ScanStatus};
use modex_core::tree::{self, TreeNode};
use nu_ansi_term::{Color, Style};
use std::collections::BTreeSet;
use tabled::Tabled;

/// One row of the `scan` summary.
#[derive(Tabled)]
pub struct ModuleRow {
    pub module: String,
    #[tabled(rename = "root folders")]
    pub root_folders: String,
    pub files: usize,
}

impl ModuleRow {
    pub fn rows(map: &ModuleMap) -> Vec<Self> {
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let records = &map[name];
                let folders: BTreeSet<&str> =
                    records.iter().map(|r| r.root_folder.as_str()).collect();
                ModuleRow {
                    module: name.clone(),
                    root_folders: folders.into_iter().collect::<Vec<_>>().join(", "),
                    files: records.len(),
                }
            })
            .collect()
    }
}

pub struct TreeView {
    color: bool,
}

impl TreeView {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, style: Style, text: String) -> String {
        if self.color {
            style.paint(text).to_string()
        } else {
            text
        }
    }

    pub fn render_node(&self, node: &TreeNode) -> String {
        match node {
            TreeNode::Module { name } => {
                self.paint(Color::Blue.bold(), format!("▾ {}", name))
            }
            TreeNode::FolderLabel { name } => {
                self.paint(Style::new().dimmed(), format!("  — {} —", name))
            }
            TreeNode::File { label, .. } => format!("    {}", label),
            TreeNode::Message { text } => self.paint(Color::Yellow.normal(), text.clone()),
        }
    }

    /// Every module, expanded.
    pub fn render_tree(&self, map: &ModuleMap, status: &ScanStatus) -> Vec<String> {
        let mut lines = Vec::new();
        for node in tree::list_modules(map, status) {
            lines.push(self.render_node(&node));
            lines.extend(
                tree::children(map, status, Some(&node))
                    .iter()
                    .map(|child| self.render_node(child)),
            );
        }
        lines
    }

    /// Entries of a single module, without the module header.
    pub fn render_module(&self, map: &ModuleMap, module: &str) -> Vec<String> {
        tree::list_entries(map, module)
            .iter()
            .map(|node| self.render_node(node))
            .collect()
    }
}
