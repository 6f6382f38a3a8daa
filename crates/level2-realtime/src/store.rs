//! Client-facing volume cache.
//!
//! Sits above the decode core: caches assembled volumes keyed by volume
//! index and rebuilds them as new chunks arrive. Updates for one volume
//! are serialized; different volumes update independently. Publication is
//! atomic: a rebuilt volume replaces the previous snapshot rather than
//! mutating it, so readers holding an `Arc` never observe a partially
//! rebuilt volume.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use level2_common::{Level2Volume, VolumeIndex};

use crate::chunk::Chunk;
use crate::error::Result;
use crate::reassemble::reassemble_chunks;

/// A published snapshot of one volume.
#[derive(Debug, Clone)]
pub struct StoredVolume {
    pub volume: Arc<Level2Volume>,
    /// Whether the End chunk had arrived when this snapshot was built.
    pub is_complete: bool,
    /// Number of chunks the snapshot was built from.
    pub chunk_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Cache of assembled volumes with incremental realtime updates.
pub struct VolumeStore {
    volumes: RwLock<HashMap<VolumeIndex, StoredVolume>>,
    /// Per-volume rebuild locks, so overlapping chunk sets for the same
    /// volume cannot race while different volumes rebuild in parallel.
    rebuild_locks: Mutex<HashMap<VolumeIndex, Arc<Mutex<()>>>>,
    expected_next: Mutex<Option<VolumeIndex>>,
}

impl VolumeStore {
    pub fn new() -> Self {
        Self {
            volumes: RwLock::new(HashMap::new()),
            rebuild_locks: Mutex::new(HashMap::new()),
            expected_next: Mutex::new(None),
        }
    }

    /// Rebuild a volume from its current chunk set and publish the result.
    ///
    /// Recomputing from an updated chunk set is idempotent and replaces
    /// any prior partial snapshot. When the set turns out complete, the
    /// expected next volume advances (wrapping 999 -> 1).
    #[instrument(skip(self, chunks), fields(volume = %index, chunks = chunks.len()))]
    pub async fn update(&self, index: VolumeIndex, chunks: &[Chunk]) -> Result<StoredVolume> {
        let lock = self.rebuild_lock(index).await;
        let _guard = lock.lock().await;

        // CPU-bound decode; no await points while assembling.
        let (volume, is_complete) = reassemble_chunks(chunks)?;
        let stored = StoredVolume {
            volume: Arc::new(volume),
            is_complete,
            chunk_count: chunks.len(),
            updated_at: Utc::now(),
        };

        self.volumes.write().await.insert(index, stored.clone());
        debug!(is_complete, "published volume snapshot");

        if is_complete {
            let mut expected = self.expected_next.lock().await;
            *expected = Some(index.next());
        }

        Ok(stored)
    }

    /// Latest published snapshot for a volume, if any.
    pub async fn get(&self, index: VolumeIndex) -> Option<StoredVolume> {
        self.volumes.read().await.get(&index).cloned()
    }

    /// The volume expected to be transmitted next, once an End chunk has
    /// been observed for any volume.
    pub async fn expected_next(&self) -> Option<VolumeIndex> {
        *self.expected_next.lock().await
    }

    /// Drop a published volume (e.g. after the feed wrapped past it).
    pub async fn evict(&self, index: VolumeIndex) -> bool {
        self.volumes.write().await.remove(&index).is_some()
    }

    async fn rebuild_lock(&self, index: VolumeIndex) -> Arc<Mutex<()>> {
        let mut locks = self.rebuild_locks.lock().await;
        locks.entry(index).or_default().clone()
    }
}

impl Default for VolumeStore {
    fn default() -> Self {
        Self::new()
    }
}
