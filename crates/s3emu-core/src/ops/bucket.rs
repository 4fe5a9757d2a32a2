//! Bucket lifecycle: create, look up, delete and list.

use chrono::{DateTime, Utc};
use dashmap::mapref::one::Ref;
use s3emu_model::types::Owner;
use tracing::debug;

use crate::error::S3ServiceResult;
use crate::state::S3Bucket;
use crate::store::S3Store;

impl S3Store {
    /// Create a bucket in `region`.
    ///
    /// # Errors
    ///
    /// `BucketAlreadyExists` if the name is taken in any region.
    pub fn create_bucket(&self, name: &str, region: &str) -> S3ServiceResult<()> {
        self.state
            .create_bucket(name.to_owned(), region.to_owned(), Owner::default())
    }

    /// Borrow a bucket. The returned guard blocks deletion of the bucket
    /// while it is alive, so keep it short-lived.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` if the bucket does not exist.
    pub fn get_bucket(&self, name: &str) -> S3ServiceResult<Ref<'_, String, S3Bucket>> {
        self.state.get_bucket(name)
    }

    /// Delete a bucket if it holds no objects. `Ok(false)` reports a
    /// non-empty bucket that was left in place.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` if the bucket does not exist.
    pub fn delete_bucket(&self, name: &str) -> S3ServiceResult<bool> {
        let removed = self.state.delete_bucket(name)?;
        if !removed {
            debug!(bucket = %name, "bucket not empty, not deleted");
        }
        Ok(removed)
    }

    /// Names and creation dates of all buckets, sorted by name.
    #[must_use]
    pub fn list_buckets(&self) -> Vec<(String, DateTime<Utc>)> {
        self.state.list_buckets()
    }

    /// Whether a bucket exists.
    #[must_use]
    pub fn bucket_exists(&self, name: &str) -> bool {
        self.state.bucket_exists(name)
    }

    /// The region a bucket was created in.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` if the bucket does not exist.
    pub fn bucket_location(&self, name: &str) -> S3ServiceResult<String> {
        Ok(self.get_bucket(name)?.region.clone())
    }
}
