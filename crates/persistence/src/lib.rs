use std::sync::Arc;

use anyhow::{Context, Result};
use core_types::{KvStore, NotesSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;
pub const DEFAULT_STORAGE_KEY: &str = "notes-store-v1";

#[derive(Debug, Error)]
pub enum SnapshotDecodeError {
    #[error("stored snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// On-disk shape: `{ "state": { "notes": [...], "activeId": ... }, "version": 1 }`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct PersistedEnvelope {
    pub state: NotesSnapshot,
    pub version: u32,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a NotesSnapshot,
    version: u32,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

pub fn encode_snapshot(snapshot: &NotesSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(&EnvelopeRef {
        state: snapshot,
        version: CURRENT_SNAPSHOT_VERSION,
    })
}

pub fn decode_snapshot(raw: &str) -> Result<NotesSnapshot, SnapshotDecodeError> {
    let probe: VersionProbe = serde_json::from_str(raw)?;
    // Only one schema exists; anything else is rejected until a migration is written.
    if probe.version != CURRENT_SNAPSHOT_VERSION {
        return Err(SnapshotDecodeError::UnsupportedVersion {
            found: probe.version,
            expected: CURRENT_SNAPSHOT_VERSION,
        });
    }
    let envelope: PersistedEnvelope = serde_json::from_str(raw)?;
    Ok(envelope.state)
}

/// Saves and restores whole-state snapshots under a single key of a [`KvStore`].
pub struct SnapshotPersistence {
    store: Arc<dyn KvStore>,
    key: String,
}

impl SnapshotPersistence {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key under which a stored value that could not be loaded is set aside.
    pub fn rejected_key(&self) -> String {
        format!("{}.rejected", self.key)
    }

    pub async fn load(&self) -> Result<Option<String>> {
        self.store.get(&self.key).await
    }

    pub async fn save(&self, value: &str) -> Result<()> {
        self.store.set(&self.key, value).await
    }

    pub async fn remove(&self) -> Result<()> {
        self.store.delete(&self.key).await
    }

    /// Loads the persisted snapshot, or an empty one when nothing usable is stored.
    ///
    /// Only backend failures are returned as errors. A value that cannot be
    /// decoded is copied to [`Self::rejected_key`] so the next save does not
    /// destroy it.
    pub async fn load_snapshot(&self) -> Result<NotesSnapshot> {
        let Some(raw) = self
            .load()
            .await
            .with_context(|| format!("failed to load snapshot `{}`", self.key))?
        else {
            info!(key = %self.key, "no stored snapshot, starting empty");
            return Ok(NotesSnapshot::default());
        };

        match decode_snapshot(&raw) {
            Ok(snapshot) => {
                info!(key = %self.key, notes = snapshot.notes.len(), "snapshot loaded");
                Ok(snapshot)
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring stored snapshot");
                if let Err(backup_err) = self.store.set(&self.rejected_key(), &raw).await {
                    warn!(error = %backup_err, "failed to set aside rejected snapshot");
                }
                Ok(NotesSnapshot::default())
            }
        }
    }

    pub async fn save_snapshot(&self, snapshot: &NotesSnapshot) -> Result<()> {
        let text = encode_snapshot(snapshot).context("failed to serialize snapshot")?;
        self.save(&text).await
    }

    /// Awaited save used at shutdown, after the write-through task has stopped.
    pub async fn flush(&self, snapshot: &NotesSnapshot) -> Result<()> {
        self.save_snapshot(snapshot).await?;
        info!(key = %self.key, notes = snapshot.notes.len(), "snapshot flushed");
        Ok(())
    }

    /// Saves every snapshot published on `updates`, in order, until the
    /// publisher is dropped. Failed writes are logged and dropped.
    pub fn spawn_write_through(
        self: Arc<Self>,
        mut updates: watch::Receiver<NotesSnapshot>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                match self.save_snapshot(&snapshot).await {
                    Ok(()) => debug!(key = %self.key, notes = snapshot.notes.len(), "snapshot saved"),
                    Err(err) => warn!(key = %self.key, error = %err, "failed to persist snapshot"),
                }
            }
            debug!(key = %self.key, "snapshot publisher closed, write-through stopped");
        })
    }
}
