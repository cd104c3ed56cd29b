use super::glob::{self, PathPattern};
use crate::config::{ExplorerConfig, LabelStyle};
use crate::error::Result;
use crate::model::{ModuleFileRecord, ModuleMap, ModuleOrigin, ScanOutcome};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// A module directory found by pattern resolution.
#[derive(Debug, Clone)]
pub struct ModuleDir {
    pub path: PathBuf,
    pub origin: ModuleOrigin,
}

pub struct Scanner;

impl Scanner {
    /// Discovers module directories and groups their files by module name.
    pub fn scan(roots: &[PathBuf], config: &ExplorerConfig) -> Result<ScanOutcome> {
        if roots.is_empty() && !config.uses_explicit_directories() {
            tracing::warn!("No workspace folder open and no module directories configured");
            return Ok(ScanOutcome::no_input());
        }

        let file_matcher = glob::compile(&config.file_pattern)?;
        let dirs = Self::resolve_module_dirs(roots, config)?;
        tracing::info!("Found {} module directories", dirs.len());

        let mut map = ModuleMap::new();
        for dir in dirs {
            let Some(module_name) = file_name_of(&dir.path) else {
                continue;
            };
            let files =
                glob::collect_files(&dir.path, &file_matcher, config.respect_ignore_files)?;
            let root_folder = root_folder(&dir.path, &dir.origin);
            let label_base = label_base(&dir, roots);

            let records = map.entry(module_name.clone()).or_default();
            for file in files {
                records.push(ModuleFileRecord {
                    module_name: module_name.clone(),
                    label: label_for(&file, label_base.as_deref(), config.label_style),
                    file_path: file,
                    root_folder: root_folder.clone(),
                });
            }
        }

        Ok(ScanOutcome::from_map(map, config.describe_patterns()))
    }

    /// Resolves module directories, either from `directories` or from the
    /// convention patterns under each root. A directory reached twice is kept once.
    pub fn resolve_module_dirs(
        roots: &[PathBuf],
        config: &ExplorerConfig,
    ) -> Result<Vec<ModuleDir>> {
        let mut seen = HashSet::new();
        let mut dirs = Vec::new();

        if config.uses_explicit_directories() {
            let cwd = std::env::current_dir()?;
            for entry in &config.directories {
                let pattern = PathPattern::under(&cwd, entry)?;
                tracing::debug!("Resolving configured directory {}", pattern.as_str());
                for path in pattern.resolve_dirs(config.max_depth)? {
                    if seen.insert(path.clone()) {
                        dirs.push(ModuleDir {
                            path,
                            origin: ModuleOrigin::Explicit,
                        });
                    }
                }
            }
            return Ok(dirs);
        }

        tracing::info!("Scanning workspace roots: {:?}", roots);
        for root in roots {
            for relative in config.convention_patterns() {
                let pattern = PathPattern::under(root, &relative)?;
                tracing::debug!("Searching in {}", pattern.as_str());
                for path in pattern.resolve_dirs(config.max_depth)? {
                    if seen.insert(path.clone()) {
                        dirs.push(ModuleDir {
                            path,
                            origin: ModuleOrigin::Convention { root: root.clone() },
                        });
                    }
                }
            }
        }
        Ok(dirs)
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Grouping folder for a module directory.
///
/// Convention matches use everything between the root and the first `src`
/// segment (`apps/web/src/modules/auth` gives `apps/web`), falling back to the
/// first segment. Explicit matches use the parent directory's name.
pub fn root_folder(module_dir: &Path, origin: &ModuleOrigin) -> String {
    match origin {
        ModuleOrigin::Convention { root } => {
            let relative = module_dir.strip_prefix(root).unwrap_or(module_dir);
            let parts: Vec<String> = relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            match parts.iter().position(|part| part == "src") {
                Some(index) if index > 0 => parts[..index].join("/"),
                _ => parts.first().cloned().unwrap_or_default(),
            }
        }
        ModuleOrigin::Explicit => module_dir
            .parent()
            .and_then(file_name_of)
            .unwrap_or_default(),
    }
}

fn label_base(dir: &ModuleDir, roots: &[PathBuf]) -> Option<PathBuf> {
    match &dir.origin {
        ModuleOrigin::Convention { root } => Some(root.clone()),
        ModuleOrigin::Explicit => roots
            .iter()
            .find(|root| dir.path.starts_with(root))
            .cloned()
            .or_else(|| dir.path.parent().map(Path::to_path_buf)),
    }
}

fn label_for(file: &Path, base: Option<&Path>, style: LabelStyle) -> String {
    match (style, base) {
        (LabelStyle::Relative, Some(base)) => match file.strip_prefix(base) {
            Ok(relative) => glob::to_slash(relative),
            Err(_) => file.to_string_lossy().into_owned(),
        },
        _ => file_name_of(file).unwrap_or_default(),
    }
}
