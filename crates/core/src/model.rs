use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One discovered file belonging to a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleFileRecord {
    pub module_name: String,
    pub file_path: PathBuf,
    pub label: String,
    /// Folder above `src/<modulesFolder>`, e.g. `apps/web` or `packages/core`.
    pub root_folder: String,
}

/// Module name to its files, in discovery order.
///
/// Modules are keyed by directory basename only, so same-named modules found
/// under different roots share one entry.
pub type ModuleMap = IndexMap<String, Vec<ModuleFileRecord>>;

/// How a module directory was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOrigin {
    /// Matched a convention pattern under this workspace root.
    Convention { root: PathBuf },
    /// Listed in the `directories` option.
    Explicit,
}

/// Result status of one scan, also used by the presenter's empty state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ScanStatus {
    /// No scan has completed yet.
    #[default]
    Pending,
    /// Neither workspace roots nor explicit directories were available.
    NoInput,
    /// Inputs existed but nothing matched.
    NoMatches { patterns: Vec<String> },
    Found { modules: usize, files: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub map: ModuleMap,
    pub status: ScanStatus,
}

impl ScanOutcome {
    pub fn no_input() -> Self {
        Self {
            map: ModuleMap::new(),
            status: ScanStatus::NoInput,
        }
    }

    /// Wraps a finished map, deriving `Found` or `NoMatches`.
    pub fn from_map(map: ModuleMap, patterns: Vec<String>) -> Self {
        let status = if map.is_empty() {
            ScanStatus::NoMatches { patterns }
        } else {
            ScanStatus::Found {
                modules: map.len(),
                files: map.values().map(Vec::len).sum(),
            }
        };
        Self { map, status }
    }
}
