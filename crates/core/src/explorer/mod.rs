//! Explorer state and refresh.
//!
//! The current scan result is held as an immutable [`Snapshot`]:
//! - Readers get cheap snapshots (Arc clone)
//! - A refresh builds a new snapshot and atomically swaps it in
//! - Results of an older refresh never replace a newer one

use crate::config::ConfigSource;
use crate::error::{ModexError, Result};
use crate::model::{ModuleMap, ScanOutcome, ScanStatus};
use crate::project::Scanner;
use crate::tree::{self, TreeNode};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

mod watch;

pub use watch::{RefreshHandle, Trigger};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const EVENT_CAPACITY: usize = 64;

pub const NO_WORKSPACE_WARNING: &str =
    "Module Explorer: No workspace folder open. Please open a folder to scan for modules.";

/// One complete scan result. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// 0 until the first refresh completes.
    pub generation: u64,
    pub map: ModuleMap,
    pub status: ScanStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerEvent {
    /// A new snapshot was installed; tree views should re-query.
    TreeChanged { generation: u64 },
    /// Something the user should see, e.g. no workspace or a failed scan.
    Warning(String),
}

pub struct Explorer {
    current: RwLock<Arc<Snapshot>>,
    roots: std::sync::RwLock<Vec<PathBuf>>,
    config: Arc<dyn ConfigSource>,
    next_generation: AtomicU64,
    events: broadcast::Sender<ExplorerEvent>,
    debounce: Duration,
    /// Cancellation token for background tasks (like the refresh loop)
    cancel_token: CancellationToken,
}

impl Explorer {
    pub fn new(roots: Vec<PathBuf>, config: Arc<dyn ConfigSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current: RwLock::new(Arc::new(Snapshot::default())),
            roots: std::sync::RwLock::new(canonicalize_all(roots)),
            config,
            next_generation: AtomicU64::new(0),
            events,
            debounce: DEFAULT_DEBOUNCE,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        match self.roots.read() {
            Ok(roots) => roots.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the workspace roots. Takes effect on the next refresh.
    pub fn set_roots(&self, roots: Vec<PathBuf>) {
        let roots = canonicalize_all(roots);
        tracing::info!("Workspace folders changed: {:?}", roots);
        match self.roots.write() {
            Ok(mut current) => *current = roots,
            Err(poisoned) => *poisoned.into_inner() = roots,
        }
    }

    pub fn config_source(&self) -> &Arc<dyn ConfigSource> {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExplorerEvent> {
        self.events.subscribe()
    }

    /// Current snapshot (cheap operation)
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Re-runs the scan and installs the result.
    ///
    /// On failure the previous snapshot stays in place and a warning is
    /// broadcast. Returns the snapshot that is current afterwards.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let roots = self.roots();
        let config = self.config.clone();

        let result = match tokio::task::spawn_blocking(move || {
            let config = config.load()?;
            Scanner::scan(&roots, &config)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => Err(ModexError::from(e)),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("Module scan #{} failed: {}", generation, err);
                self.notify(ExplorerEvent::Warning(format!(
                    "Module Explorer: scan failed, keeping previous results: {}",
                    err
                )));
                return Err(err);
            }
        };

        let ScanOutcome { map, status } = outcome;
        if status == ScanStatus::NoInput {
            self.notify(ExplorerEvent::Warning(NO_WORKSPACE_WARNING.to_string()));
        }

        let snapshot = Arc::new(Snapshot {
            generation,
            map,
            status,
        });
        if self.install(snapshot).await {
            self.notify(ExplorerEvent::TreeChanged { generation });
        } else {
            tracing::debug!("Discarding stale scan result #{}", generation);
        }
        Ok(self.snapshot().await)
    }

    /// Swaps in `snapshot` unless a newer one is already installed.
    async fn install(&self, snapshot: Arc<Snapshot>) -> bool {
        let mut current = self.current.write().await;
        if current.generation >= snapshot.generation {
            return false;
        }
        tracing::info!(
            "Installed scan #{}: {} modules",
            snapshot.generation,
            snapshot.map.len()
        );
        *current = snapshot;
        true
    }

    fn notify(&self, event: ExplorerEvent) {
        if let ExplorerEvent::Warning(message) = &event {
            tracing::warn!("{}", message);
        }
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub async fn list_modules(&self) -> Vec<TreeNode> {
        let snapshot = self.snapshot().await;
        tree::list_modules(&snapshot.map, &snapshot.status)
    }

    pub async fn list_entries(&self, module: &str) -> Vec<TreeNode> {
        let snapshot = self.snapshot().await;
        tree::list_entries(&snapshot.map, module)
    }

    pub async fn children(&self, parent: Option<&TreeNode>) -> Vec<TreeNode> {
        let snapshot = self.snapshot().await;
        tree::children(&snapshot.map, &snapshot.status, parent)
    }
}

impl Drop for Explorer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

fn canonicalize_all(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    roots
        .into_iter()
        .map(|root| root.canonicalize().unwrap_or(root))
        .collect()
}
