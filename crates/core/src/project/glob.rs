//! Pattern matching over the filesystem.
//!
//! A pattern is split into a literal base directory and a glob remainder; the
//! base is walked and entries whose base-relative path matches the remainder
//! are returned. `*` never crosses a path separator.

use crate::error::{ModexError, Result};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

pub fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| ModexError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn has_meta(s: &str) -> bool {
    s.contains(&GLOB_META[..])
}

/// Joins path components with `/` so globs behave the same on every platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    base: PathBuf,
    matcher: Option<GlobMatcher>,
    /// Walk depth implied by the remainder when it has no `**`.
    implied_depth: Option<usize>,
}

impl PathPattern {
    /// `pattern` resolved against `base`. The base is taken literally, so a
    /// directory named e.g. `[web]` is never read as a glob. An absolute
    /// `pattern` ignores `base`.
    pub fn under(base: &Path, pattern: &str) -> Result<Self> {
        let raw = base.join(pattern).to_string_lossy().into_owned();
        let mut base = base.to_path_buf();
        let mut rest: Vec<String> = Vec::new();

        for component in Path::new(pattern).components() {
            let text = component.as_os_str().to_string_lossy();
            if rest.is_empty() && !has_meta(&text) {
                base.push(component.as_os_str());
            } else {
                rest.push(text.into_owned());
            }
        }

        if rest.is_empty() {
            return Ok(Self {
                raw,
                base,
                matcher: None,
                implied_depth: Some(0),
            });
        }

        let remainder = rest.join("/");
        let implied_depth = if rest.iter().any(|part| part.contains("**")) {
            None
        } else {
            Some(rest.len())
        };

        Ok(Self {
            raw,
            base,
            matcher: Some(compile(&remainder)?),
            implied_depth,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Literal directory the walk starts from.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn walk_depth(&self, max_depth: Option<usize>) -> Option<usize> {
        match (self.implied_depth, max_depth) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, limit) => limit,
        }
    }

    /// Directories matching this pattern, in file-name order.
    pub fn resolve_dirs(&self, max_depth: Option<usize>) -> Result<Vec<PathBuf>> {
        let Some(matcher) = &self.matcher else {
            return Ok(if self.base.is_dir() {
                vec![self.base.clone()]
            } else {
                Vec::new()
            });
        };

        if !self.base.is_dir() {
            tracing::debug!("Pattern base {} does not exist", self.base.display());
            return Ok(Vec::new());
        }

        let mut walker = WalkDir::new(&self.base)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        if let Some(depth) = self.walk_depth(max_depth) {
            walker = walker.max_depth(depth);
        }

        let mut found = Vec::new();
        for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        tracing::warn!("Skipping symlink loop back to {}", ancestor.display());
                        continue;
                    }
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
                    {
                        continue;
                    }
                    return Err(err.into());
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.base) else {
                continue;
            };
            if matcher.is_match(to_slash(relative)) {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Files under `dir` whose dir-relative path matches `pattern`, sorted by name.
pub fn collect_files(
    dir: &Path,
    pattern: &GlobMatcher,
    respect_ignore_files: bool,
) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(dir)
        .standard_filters(respect_ignore_files)
        .hidden(true)
        .parents(respect_ignore_files)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => match err.io_error() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => continue,
                Some(_) => return Err(err.into()),
                None => {
                    tracing::warn!("Skipping entry under {}: {}", dir.display(), err);
                    continue;
                }
            },
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        if pattern.is_match(to_slash(relative)) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
