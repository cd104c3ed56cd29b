//! The `modulesExplorer.openFile` command.

use crate::error::{ModexError, Result};
use crate::tree::Action;
use std::path::Path;
use std::process::Command;

pub trait FileOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Runs a node action. Only file nodes carry one.
pub fn perform(opener: &dyn FileOpener, action: &Action) -> Result<()> {
    match action {
        Action::OpenFile { path } => opener.open(path),
    }
}

/// Opens files with `$VISUAL`, `$EDITOR` or the platform opener.
#[derive(Debug, Clone, Default)]
pub struct EditorOpener {
    program: Option<String>,
}

impl EditorOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed program instead of consulting the environment.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn resolve_program(&self) -> String {
        if let Some(program) = &self.program {
            return program.clone();
        }
        ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| platform_opener().to_string())
    }
}

fn platform_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

impl FileOpener for EditorOpener {
    fn open(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(ModexError::NotFound(path.to_path_buf()));
        }

        // Editors are often configured with flags, e.g. `code --wait`.
        let program = self.resolve_program();
        let mut parts = program.split_whitespace();
        let executable = parts
            .next()
            .ok_or_else(|| ModexError::Config("empty editor command".to_string()))?;

        tracing::info!("Opening {} with {}", path.display(), program);
        let status = Command::new(executable).args(parts).arg(path).status()?;
        if !status.success() {
            return Err(ModexError::Internal(format!(
                "'{}' exited with {}",
                program, status
            )));
        }
        Ok(())
    }
}
