use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// A path to subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub recursive: bool,
}

impl WatchTarget {
    pub fn recursive(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
        }
    }

    pub fn shallow(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: false,
        }
    }

    fn mode(&self) -> RecursiveMode {
        if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        }
    }
}

pub struct FsWatcher {
    watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    watched: Vec<WatchTarget>,
}

impl FsWatcher {
    pub fn new(targets: &[WatchTarget]) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let mut fs_watcher = Self {
            watcher,
            rx,
            watched: Vec::new(),
        };
        fs_watcher.retarget(targets)?;
        Ok(fs_watcher)
    }

    /// Replaces the watched paths. Targets that do not exist are skipped.
    pub fn retarget(&mut self, targets: &[WatchTarget]) -> notify::Result<()> {
        if targets == self.watched.as_slice() {
            return Ok(());
        }

        for target in std::mem::take(&mut self.watched) {
            if let Err(e) = self.watcher.unwatch(&target.path) {
                tracing::debug!("Failed to unwatch {}: {}", target.path.display(), e);
            }
        }

        for target in targets {
            if !target.path.exists() {
                tracing::debug!("Not watching missing path {}", target.path.display());
                continue;
            }
            self.watcher.watch(&target.path, target.mode())?;
            tracing::info!("Started watching {}", target.path.display());
            self.watched.push(target.clone());
        }
        Ok(())
    }

    /// Next event; watcher errors are logged and skipped.
    /// Returns `None` once the underlying watcher is gone.
    pub async fn next_event_async(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await? {
                Ok(event) => return Some(event),
                Err(e) => tracing::warn!("File watcher error: {}", e),
            }
        }
    }
}
