// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Snapshot persistence seam.
//!
//! The engine hands a complete [`ResultSnapshot`] to a [`SnapshotStore`]
//! at the end of each run. The storage schema beyond "all fields optional
//! except the originating target" belongs to the collaborator; the
//! [`JsonFileStore`] here writes one pretty-printed JSON document per run
//! under a output directory.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use sitepulse_core::ResultSnapshot;

/// Errors that can occur while persisting a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("snapshot write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failure.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence collaborator for completed runs.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist one complete run snapshot.
    async fn persist(&self, snapshot: &ResultSnapshot) -> Result<(), StoreError>;
}

/// Snapshot store writing one JSON file per run id.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store writing under the given directory (created on first use).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a given run's snapshot will be written to.
    pub fn path_for(&self, snapshot: &ResultSnapshot) -> PathBuf {
        self.dir.join(format!("{}.json", snapshot.run_id))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn persist(&self, snapshot: &ResultSnapshot) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(snapshot);
        let json = serde_json::to_string_pretty(snapshot)?;
        tokio::fs::write(&path, json).await?;
        info!(path = %path.display(), "snapshot persisted");
        Ok(())
    }
}
