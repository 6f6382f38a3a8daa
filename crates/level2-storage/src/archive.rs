//! Archive record listing and retrieval.

use bytes::Bytes;
use chrono::NaiveDate;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::ObjectStorageConfig;
use crate::error::Result;
use crate::record::{date_site_prefix, RecordIdentifier};

/// Client for the completed-archive bucket.
pub struct ArchiveClient {
    store: Arc<dyn ObjectStore>,
}

impl ArchiveClient {
    pub fn new(config: &ObjectStorageConfig) -> Result<Self> {
        Ok(Self {
            store: config.build_store(&config.archive_bucket)?,
        })
    }

    /// List the records available for a site and date, in chronological
    /// order. Keys that do not parse as record identifiers are skipped.
    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        site: &str,
        date: NaiveDate,
    ) -> Result<Vec<RecordIdentifier>> {
        let prefix = Path::from(date_site_prefix(site, date));
        let objects: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;

        let mut records: Vec<RecordIdentifier> = objects
            .iter()
            .filter_map(|meta| RecordIdentifier::from_key(meta.location.as_ref()).ok())
            .collect();
        // Names embed the time token, so name order is chronological.
        records.sort_by(|a, b| a.name().cmp(b.name()));

        debug!(count = records.len(), "listed archive records");
        Ok(records)
    }

    /// Fetch a record's complete contents.
    #[instrument(skip(self), fields(record = %record))]
    pub async fn download_record(&self, record: &RecordIdentifier) -> Result<Bytes> {
        let location = Path::from(record.key());
        let bytes = self.store.get(&location).await?.bytes().await?;
        debug!(size = bytes.len(), "downloaded archive record");
        Ok(bytes)
    }
}
