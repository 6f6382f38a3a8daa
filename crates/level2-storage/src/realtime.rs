//! Realtime chunk listing and retrieval.

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::{debug, instrument};

use level2_common::VolumeIndex;
use level2_realtime::{Chunk, ChunkIdentifier};

use crate::config::ObjectStorageConfig;
use crate::error::{Result, StorageError};

/// Client for the realtime chunk bucket.
///
/// Chunk keys follow `SITE/VVV/YYYYMMDD-HHMMSS-NNN-R`: zero-padded volume
/// directory, then the chunk sequence name.
pub struct RealtimeClient {
    store: Arc<dyn ObjectStore>,
}

impl RealtimeClient {
    pub fn new(config: &ObjectStorageConfig) -> Result<Self> {
        Ok(Self {
            store: config.build_store(&config.realtime_bucket)?,
        })
    }

    /// The volume currently being transmitted for a site: the volume
    /// directory holding the most recently modified chunk.
    ///
    /// This lists every chunk under the site prefix (the feed retains
    /// only a few hours, so the listing stays small).
    #[instrument(skip(self))]
    pub async fn latest_volume(&self, site: &str) -> Result<VolumeIndex> {
        let prefix = Path::from(site);
        let objects: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;

        let newest = objects
            .iter()
            .max_by_key(|meta| meta.last_modified)
            .ok_or_else(|| StorageError::NoVolumes(site.to_string()))?;

        let (_, volume, _) = parse_chunk_key(newest.location.as_ref())?;
        debug!(%volume, "resolved latest volume");
        Ok(volume)
    }

    /// List the chunks of one volume, in transmission order.
    #[instrument(skip(self))]
    pub async fn list_chunks(
        &self,
        site: &str,
        volume: VolumeIndex,
    ) -> Result<Vec<ChunkIdentifier>> {
        let prefix = Path::from(volume_prefix(site, volume));
        let objects: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;

        let mut chunks = Vec::with_capacity(objects.len());
        for meta in &objects {
            let (site, volume, name) = parse_chunk_key(meta.location.as_ref())?;
            chunks.push(ChunkIdentifier::new(site, volume, name));
        }
        // Sequence names are monotonic, so name order is arrival order.
        chunks.sort_by(|a, b| a.name().cmp(b.name()));

        debug!(count = chunks.len(), "listed chunks");
        Ok(chunks)
    }

    /// Fetch one chunk's payload.
    #[instrument(skip(self), fields(chunk = %id))]
    pub async fn download_chunk(&self, id: &ChunkIdentifier) -> Result<Chunk> {
        let location = Path::from(chunk_key(id));
        let bytes: Bytes = self.store.get(&location).await?.bytes().await?;
        debug!(size = bytes.len(), "downloaded chunk");
        Ok(Chunk::new(id.clone(), bytes))
    }
}

fn volume_prefix(site: &str, volume: VolumeIndex) -> String {
    format!("{}/{:03}", site, volume.as_number())
}

fn chunk_key(id: &ChunkIdentifier) -> String {
    format!("{}/{}", volume_prefix(id.site(), id.volume()), id.name())
}

fn parse_chunk_key(key: &str) -> Result<(String, VolumeIndex, String)> {
    let malformed = || StorageError::MalformedKey(key.to_string());

    let mut parts = key.split('/');
    let site = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let volume = parts
        .next()
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(VolumeIndex::new)
        .ok_or_else(malformed)?;
    let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }

    Ok((site.to_string(), volume, name.to_string()))
}
