//! Optional persistent counters of classification events.
//!
//! Counting is dormant unless a store is attached to the trigger. Writes run
//! as detached tasks; no classification decision waits for or depends on them.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs as async_fs;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use tutorlens_core::Category;

use crate::error::Result;

/// Event counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    /// Executive prompts that raised an advisory
    pub executive: u64,
    /// Adaptive prompts observed
    pub adaptive: u64,
}

impl UsageCounts {
    /// Adds one event of `category`.
    pub fn increment(&mut self, category: Category) {
        match category {
            Category::Executive => self.executive += 1,
            Category::Adaptive => self.adaptive += 1,
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(contents)?)
    }
}

/// JSON file holding [`UsageCounts`].
#[derive(Debug)]
pub struct UsageStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UsageStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Counter file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current counts; a missing file counts as zero.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(&self) -> Result<UsageCounts> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => UsageCounts::parse(&contents),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(UsageCounts::default()),
            Err(error) => Err(error.into()),
        }
    }

    /// Increments the counter for `category` and persists it.
    ///
    /// Concurrent calls are serialized so no increment is lost.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or written
    pub async fn record(&self, category: Category) -> Result<UsageCounts> {
        let guard = self.write_lock.lock().await;

        let mut counts = match async_fs::read_to_string(&self.path).await {
            Ok(contents) => UsageCounts::parse(&contents)?,
            Err(error) if error.kind() == ErrorKind::NotFound => UsageCounts::default(),
            Err(error) => return Err(error.into()),
        };
        counts.increment(category);

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(&self.path, serde_json::to_vec_pretty(&counts)?).await?;
        drop(guard);

        debug!(%category, path = %self.path.display(), "recorded usage event");
        Ok(counts)
    }

    /// Records `category` in a detached task.
    ///
    /// Failures are logged and otherwise ignored. Outside a tokio runtime the
    /// event is dropped.
    pub fn record_detached(self: &Arc<Self>, category: Category) {
        let Ok(handle) = Handle::try_current() else {
            warn!(%category, "no async runtime; usage event dropped");
            return;
        };

        let store = Arc::clone(self);
        drop(handle.spawn(async move {
            if let Err(error) = store.record(category).await {
                warn!(%category, "failed to record usage event: {error}");
            }
        }));
    }
}
