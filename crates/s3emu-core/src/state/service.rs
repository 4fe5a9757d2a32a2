//! The bucket namespace.
//!
//! [`S3ServiceState`] owns every bucket and enforces that bucket names are
//! unique across regions. All operations are thread-safe via `DashMap`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::Ref;
use s3emu_model::types::Owner;
use tracing::info;

use super::bucket::S3Bucket;
use crate::error::S3ServiceError;

/// All buckets, keyed by name.
///
/// Holding a [`Ref`] to a bucket keeps its shard read-locked, which is what
/// makes bucket deletion exclusive with in-flight object operations.
pub struct S3ServiceState {
    buckets: DashMap<String, S3Bucket>,
}

impl std::fmt::Debug for S3ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ServiceState")
            .field("bucket_count", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

impl Default for S3ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl S3ServiceState {
    /// Create an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Create a bucket.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::BucketAlreadyExists`] if the name is taken in any
    /// region.
    pub fn create_bucket(
        &self,
        name: String,
        region: String,
        owner: Owner,
    ) -> Result<(), S3ServiceError> {
        match self.buckets.entry(name) {
            Entry::Occupied(entry) => Err(S3ServiceError::BucketAlreadyExists {
                bucket: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                info!(bucket = %entry.key(), region = %region, "bucket created");
                let bucket = S3Bucket::new(entry.key().clone(), region, owner);
                entry.insert(bucket);
                Ok(())
            }
        }
    }

    /// Delete a bucket if it holds no objects.
    ///
    /// Returns `Ok(false)` when the bucket exists but is not empty.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchBucket`] if the bucket does not exist.
    pub fn delete_bucket(&self, name: &str) -> Result<bool, S3ServiceError> {
        if self.buckets.remove_if(name, |_, b| b.is_empty()).is_some() {
            info!(bucket = %name, "bucket deleted");
            return Ok(true);
        }
        if self.buckets.contains_key(name) {
            Ok(false)
        } else {
            Err(S3ServiceError::NoSuchBucket {
                bucket: name.to_owned(),
            })
        }
    }

    /// Borrow a bucket.
    ///
    /// # Errors
    ///
    /// [`S3ServiceError::NoSuchBucket`] if the bucket does not exist.
    pub fn get_bucket(&self, name: &str) -> Result<Ref<'_, String, S3Bucket>, S3ServiceError> {
        self.buckets
            .get(name)
            .ok_or_else(|| S3ServiceError::NoSuchBucket {
                bucket: name.to_owned(),
            })
    }

    /// Names and creation dates of all buckets, sorted by name.
    #[must_use]
    pub fn list_buckets(&self) -> Vec<(String, DateTime<Utc>)> {
        let mut buckets: Vec<_> = self
            .buckets
            .iter()
            .map(|entry| (entry.name.clone(), entry.creation_date))
            .collect();
        buckets.sort_by(|a, b| a.0.cmp(&b.0));
        buckets
    }

    /// Whether a bucket exists.
    #[must_use]
    pub fn bucket_exists(&self, name: &str) -> bool {
        self.buckets.contains_key(name)
    }

    /// Drop every bucket.
    pub fn reset(&self) {
        info!("resetting bucket namespace");
        self.buckets.clear();
    }
}
