//! Object storage configuration.

use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, StorageError};

/// Configuration for the public NEXRAD buckets.
///
/// Both buckets are open data; requests are unsigned and no credentials
/// are involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// AWS region hosting the buckets.
    pub region: String,
    /// Completed archive records.
    pub archive_bucket: String,
    /// Realtime volume chunks.
    pub realtime_bucket: String,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            archive_bucket: "noaa-nexrad-level2".to_string(),
            realtime_bucket: "unidata-nexrad-level2-chunks".to_string(),
        }
    }
}

impl ObjectStorageConfig {
    pub(crate) fn build_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&self.region)
            .with_skip_signature(true)
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_buckets() {
        let config = ObjectStorageConfig::default();
        assert_eq!(config.archive_bucket, "noaa-nexrad-level2");
        assert_eq!(config.realtime_bucket, "unidata-nexrad-level2-chunks");
        assert_eq!(config.region, "us-east-1");
    }
}
