//! Explorer configuration.
//!
//! Options live under the `modulesExplorer` namespace of a JSON settings file,
//! either as a nested object or as dotted keys (`"modulesExplorer.filePattern"`).

use crate::error::{ModexError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const NAMESPACE: &str = "modulesExplorer";

/// Settings file consulted when no explicit `--config` is given.
pub const DEFAULT_SETTINGS_FILE: &str = ".vscode/settings.json";

pub const DEFAULT_MODULES_FOLDER: &str = "modules";
pub const DEFAULT_FILE_PATTERN: &str = "**/*";
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Top-level folders searched by convention discovery.
pub const CONVENTION_ROOTS: [&str; 2] = ["apps", "packages"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelStyle {
    /// Only the file name.
    #[default]
    FileName,
    /// Path relative to the workspace root.
    Relative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplorerConfig {
    /// Explicit module directories (globs or paths). Non-empty disables convention discovery.
    pub directories: Vec<String>,
    pub modules_folder: String,
    pub file_pattern: String,
    pub watch_pattern: Option<String>,
    /// `None` walks without a depth bound.
    pub max_depth: Option<usize>,
    pub label_style: LabelStyle,
    pub respect_ignore_files: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            modules_folder: DEFAULT_MODULES_FOLDER.to_string(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            watch_pattern: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            label_style: LabelStyle::FileName,
            respect_ignore_files: false,
        }
    }
}

impl ExplorerConfig {
    pub fn uses_explicit_directories(&self) -> bool {
        !self.directories.is_empty()
    }

    /// Root-relative patterns used by convention discovery.
    pub fn convention_patterns(&self) -> Vec<String> {
        CONVENTION_ROOTS
            .iter()
            .map(|top| format!("{}/**/src/{}/*", top, self.modules_folder))
            .collect()
    }

    pub fn effective_watch_pattern(&self) -> String {
        self.watch_pattern
            .clone()
            .unwrap_or_else(|| format!("**/src/{}/**", self.modules_folder))
    }

    /// Human-readable list of what a scan with this config looks for.
    pub fn describe_patterns(&self) -> Vec<String> {
        if self.uses_explicit_directories() {
            self.directories.clone()
        } else {
            self.convention_patterns()
        }
    }
}

/// Source of the explorer configuration.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<ExplorerConfig>;

    /// Backing file, if any. Changes to it are reported as config changes.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Raw `modulesExplorer` section, used to decide whether a file change
    /// actually touched this namespace.
    fn section(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.load()?)?)
    }
}

/// Fixed configuration, used by tests and when no settings file applies.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub ExplorerConfig);

impl ConfigSource for StaticConfig {
    fn load(&self) -> Result<ExplorerConfig> {
        Ok(self.0.clone())
    }
}

/// Command-line overrides layered on top of whatever the file says.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub directories: Vec<String>,
    pub modules_folder: Option<String>,
    pub file_pattern: Option<String>,
    pub max_depth: Option<usize>,
    pub label_style: Option<LabelStyle>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: ExplorerConfig) -> ExplorerConfig {
        if !self.directories.is_empty() {
            config.directories = self.directories.clone();
        }
        if let Some(folder) = &self.modules_folder {
            config.modules_folder = folder.clone();
        }
        if let Some(pattern) = &self.file_pattern {
            config.file_pattern = pattern.clone();
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        if let Some(style) = self.label_style {
            config.label_style = style;
        }
        config
    }
}

/// A JSON settings file, e.g. `.vscode/settings.json`. A missing file yields defaults.
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
    overrides: ConfigOverrides,
}

impl JsonSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overrides: ConfigOverrides::default(),
        }
    }

    /// Settings file for a workspace root.
    pub fn for_root(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_SETTINGS_FILE))
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    fn read_section(&self) -> Result<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = serde_json::from_str(&content)?;
        extract_section(&value)
    }
}

impl ConfigSource for JsonSettingsFile {
    fn load(&self) -> Result<ExplorerConfig> {
        let section = self.read_section()?;
        let config: ExplorerConfig = serde_json::from_value(Value::Object(section))?;
        Ok(self.overrides.apply(config))
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn section(&self) -> Result<Value> {
        Ok(Value::Object(self.read_section()?))
    }
}

/// Collects the `modulesExplorer` namespace from a settings document.
/// Dotted keys win over the nested object when both are present.
pub fn extract_section(settings: &Value) -> Result<Map<String, Value>> {
    let Some(object) = settings.as_object() else {
        return Err(ModexError::Config(
            "settings file must contain a JSON object".to_string(),
        ));
    };

    let mut section = Map::new();
    match object.get(NAMESPACE) {
        Some(Value::Object(nested)) => section.extend(nested.clone()),
        Some(other) => {
            return Err(ModexError::Config(format!(
                "'{}' must be an object, found {}",
                NAMESPACE, other
            )));
        }
        None => {}
    }

    let prefix = format!("{}.", NAMESPACE);
    for (key, value) in object {
        if let Some(option) = key.strip_prefix(&prefix) {
            section.insert(option.to_string(), value.clone());
        }
    }
    Ok(section)
}
