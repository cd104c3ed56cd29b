use super::Explorer;
use crate::config::{ConfigSource, ExplorerConfig};
use crate::error::{ModexError, Result};
use crate::project::glob::{self, PathPattern};
use crate::project::watcher::{FsWatcher, WatchTarget};
use globset::GlobMatcher;
use notify::{Event, EventKind};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a refresh was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    WorkspaceChanged,
    ConfigChanged,
    FileSystem(Vec<PathBuf>),
}

impl Trigger {
    /// Whether the watched paths may have moved.
    fn retargets(&self) -> bool {
        matches!(
            self,
            Trigger::Startup | Trigger::WorkspaceChanged | Trigger::ConfigChanged
        )
    }
}

/// Sends triggers to a running refresh loop.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<Trigger>,
    explorer: Weak<Explorer>,
}

impl RefreshHandle {
    /// Returns false once the loop has stopped.
    pub fn trigger(&self, trigger: Trigger) -> bool {
        self.tx.send(trigger).is_ok()
    }

    /// Replaces the workspace roots and schedules a refresh.
    pub fn set_roots(&self, roots: Vec<PathBuf>) -> bool {
        match self.explorer.upgrade() {
            Some(explorer) => {
                explorer.set_roots(roots);
                self.trigger(Trigger::WorkspaceChanged)
            }
            None => false,
        }
    }
}

/// Decides which filesystem events are refresh triggers.
struct WatchFilter {
    roots: Vec<PathBuf>,
    pattern: GlobMatcher,
    explicit_bases: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    config_section: Option<Value>,
}

impl WatchFilter {
    fn new(
        roots: Vec<PathBuf>,
        config: &ExplorerConfig,
        source: &dyn ConfigSource,
    ) -> Result<Self> {
        let pattern = glob::compile(&config.effective_watch_pattern())?;

        let mut explicit_bases = Vec::new();
        if config.uses_explicit_directories() {
            let cwd = std::env::current_dir()?;
            for entry in &config.directories {
                let pattern = PathPattern::under(&cwd, entry)?;
                explicit_bases.push(pattern.base().to_path_buf());
            }
        }

        let config_path = source.path().map(absolute_path);
        Ok(Self {
            roots,
            pattern,
            explicit_bases,
            config_path,
            config_section: source.section().ok(),
        })
    }

    fn targets(&self) -> Vec<WatchTarget> {
        let mut targets: Vec<WatchTarget> = self
            .roots
            .iter()
            .chain(self.explicit_bases.iter())
            .map(WatchTarget::recursive)
            .collect();

        if let Some(dir) = self.config_path.as_deref().and_then(Path::parent) {
            if !self.roots.iter().any(|root| dir.starts_with(root)) {
                targets.push(WatchTarget::shallow(dir));
            }
        }
        targets
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if self.explicit_bases.iter().any(|base| path.starts_with(base)) {
            return true;
        }
        self.roots.iter().any(|root| {
            path.strip_prefix(root)
                .map(|relative| self.pattern.is_match(glob::to_slash(relative)))
                .unwrap_or(false)
        })
    }

    /// Only a change inside the `modulesExplorer` section counts.
    fn config_changed(&mut self, source: &dyn ConfigSource) -> bool {
        let section = match source.section() {
            Ok(section) => Some(section),
            Err(e) => {
                // Surface the parse error through a refresh.
                tracing::warn!("Failed to read settings: {}", e);
                None
            }
        };
        if section == self.config_section && section.is_some() {
            return false;
        }
        self.config_section = section;
        true
    }

    fn classify(&mut self, event: &Event, source: &dyn ConfigSource) -> Option<Trigger> {
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
        ) {
            return None;
        }

        if let Some(config_path) = &self.config_path {
            if event.paths.iter().any(|p| p == config_path) {
                return self
                    .config_changed(source)
                    .then_some(Trigger::ConfigChanged);
            }
        }

        let paths: Vec<PathBuf> = event
            .paths
            .iter()
            .filter(|p| self.is_relevant(p))
            .cloned()
            .collect();
        (!paths.is_empty()).then_some(Trigger::FileSystem(paths))
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    // The file may not exist yet; canonicalize its directory instead.
    match (absolute.parent(), absolute.file_name()) {
        (Some(dir), Some(name)) => dir
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

async fn next_fs_event(watcher: &mut Option<FsWatcher>) -> Option<Event> {
    match watcher {
        Some(watcher) => watcher.next_event_async().await,
        None => std::future::pending().await,
    }
}

impl Explorer {
    fn build_filter(&self) -> Result<WatchFilter> {
        let source = self.config_source().as_ref();
        let config = source.load()?;
        WatchFilter::new(self.roots(), &config, source)
    }

    /// Starts the single refresh loop: triggers are debounced, coalesced and
    /// run one at a time. Filesystem events under the watched roots feed the
    /// same loop. The loop exits when `cancel_token` is cancelled.
    pub fn start_watch_with_token(
        self: Arc<Self>,
        cancel_token: CancellationToken,
    ) -> Result<RefreshHandle> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RefreshHandle {
            tx: tx.clone(),
            explorer: Arc::downgrade(&self),
        };

        let mut filter = self.build_filter()?;
        let mut watcher = match FsWatcher::new(&filter.targets()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!("File watching unavailable, refreshing on demand only: {}", e);
                None
            }
        };

        let explorer_weak = Arc::downgrade(&self);
        let debounce_interval = self.debounce;
        drop(self);

        tokio::spawn(async move {
            tracing::info!("Refresh loop started");
            let mut pending: Vec<Trigger> = Vec::new();
            // Set by the first queued trigger; later events never push it back.
            let mut deadline: Option<Instant> = None;

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        break;
                    }
                    trigger = rx.recv() => {
                        match trigger {
                            Some(t) => {
                                pending.push(t);
                                deadline.get_or_insert_with(|| Instant::now() + debounce_interval);
                            }
                            None => break,
                        }
                    }
                    event = next_fs_event(&mut watcher) => {
                        match event {
                            Some(e) => {
                                let Some(explorer) = explorer_weak.upgrade() else {
                                    break;
                                };
                                let source = explorer.config_source().as_ref();
                                if let Some(t) = filter.classify(&e, source) {
                                    pending.push(t);
                                    deadline.get_or_insert_with(|| Instant::now() + debounce_interval);
                                }
                            }
                            None => {
                                tracing::warn!("File watcher stopped");
                                watcher = None;
                            }
                        }
                    }
                    _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        deadline = None;
                        let Some(explorer) = explorer_weak.upgrade() else {
                            break;
                        };

                        if pending.iter().any(Trigger::retargets) {
                            match explorer.build_filter() {
                                Ok(new_filter) => {
                                    filter = new_filter;
                                    if let Some(w) = watcher.as_mut() {
                                        if let Err(e) = w.retarget(&filter.targets()) {
                                            tracing::warn!("Failed to update watched paths: {}", e);
                                        }
                                    }
                                }
                                Err(e) => tracing::warn!("Keeping previous watch setup: {}", e),
                            }
                        }

                        tracing::info!(
                            "Refreshing after {} trigger(s), first: {:?}",
                            pending.len(),
                            pending.first()
                        );
                        pending.clear();

                        if let Err(e) = explorer.refresh().await {
                            tracing::debug!("Refresh failed: {}", e);
                        }
                    }
                }
            }
            tracing::info!("Refresh loop ended");
        });

        if tx.send(Trigger::Startup).is_err() {
            return Err(ModexError::Internal("refresh loop did not start".to_string()));
        }
        Ok(handle)
    }

    /// Starts the refresh loop tied to the explorer's own lifetime.
    pub fn watch(self: Arc<Self>) -> Result<RefreshHandle> {
        let cancel_token = self.cancel_token.clone();
        self.start_watch_with_token(cancel_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsonSettingsFile, StaticConfig};
    use notify::event::{CreateKind, ModifyKind};
    use std::fs;

    fn filter_for(config: &ExplorerConfig) -> WatchFilter {
        let source = StaticConfig(config.clone());
        WatchFilter::new(vec![PathBuf::from("/ws")], config, &source).unwrap()
    }

    #[test]
    fn test_events_under_modules_are_triggers() {
        let config = ExplorerConfig::default();
        let source = StaticConfig(config.clone());
        let mut filter = filter_for(&config);

        let inside = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/ws/apps/web/src/modules/auth/login.ts"));
        assert_eq!(
            filter.classify(&inside, &source),
            Some(Trigger::FileSystem(vec![PathBuf::from(
                "/ws/apps/web/src/modules/auth/login.ts"
            )]))
        );

        let outside = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/ws/apps/web/src/main.ts"));
        assert_eq!(filter.classify(&outside, &source), None);
    }

    #[test]
    fn test_access_events_are_ignored() {
        let config = ExplorerConfig::default();
        let source = StaticConfig(config.clone());
        let mut filter = filter_for(&config);

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/ws/apps/web/src/modules/auth/login.ts"));
        assert_eq!(filter.classify(&access, &source), None);
    }

    #[test]
    fn test_explicit_bases_are_watched() {
        let config = ExplorerConfig {
            directories: vec!["/shared/libs/*".to_string()],
            ..Default::default()
        };
        let source = StaticConfig(config.clone());
        let mut filter = filter_for(&config);

        assert!(filter.targets().contains(&WatchTarget::recursive("/shared/libs")));
        let event = Event::new(EventKind::Remove(notify::event::RemoveKind::File))
            .add_path(PathBuf::from("/shared/libs/auth/index.ts"));
        assert!(matches!(
            filter.classify(&event, &source),
            Some(Trigger::FileSystem(_))
        ));
    }

    #[test]
    fn test_only_namespace_edits_count_as_config_changes() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        fs::write(&settings, r#"{ "editor.tabSize": 4 }"#).unwrap();

        let source = JsonSettingsFile::new(settings.clone());
        let config = source.load().unwrap();
        let mut filter = WatchFilter::new(vec![PathBuf::from("/ws")], &config, &source).unwrap();
        let config_path = filter.config_path.clone().unwrap();
        let saved = || Event::new(EventKind::Modify(ModifyKind::Any)).add_path(config_path.clone());

        fs::write(&settings, r#"{ "editor.tabSize": 2 }"#).unwrap();
        assert_eq!(filter.classify(&saved(), &source), None);

        fs::write(
            &settings,
            r#"{ "editor.tabSize": 2, "modulesExplorer.modulesFolder": "features" }"#,
        )
        .unwrap();
        assert_eq!(filter.classify(&saved(), &source), Some(Trigger::ConfigChanged));
        assert_eq!(filter.classify(&saved(), &source), None);

        fs::write(&settings, r#"{ "modulesExplorer": "#).unwrap();
        assert_eq!(filter.classify(&saved(), &source), Some(Trigger::ConfigChanged));
    }
}
