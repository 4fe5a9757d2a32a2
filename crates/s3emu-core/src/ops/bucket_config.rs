//! Bucket sub-resources: versioning, lifecycle, policy, website and ACL.

use bytes::Bytes;
use s3emu_model::types::{Acl, LifecycleRule, VersioningStatus};
use tracing::debug;

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::store::S3Store;

impl S3Store {
    // -----------------------------------------------------------------------
    // Versioning
    // -----------------------------------------------------------------------

    /// Current versioning mode.
    pub fn get_versioning(&self, bucket: &str) -> S3ServiceResult<VersioningStatus> {
        Ok(*self.get_bucket(bucket)?.versioning.read())
    }

    /// Switch versioning mode. `Unset` cannot be restored once configured and
    /// is ignored.
    pub fn set_versioning(&self, bucket: &str, status: VersioningStatus) -> S3ServiceResult<()> {
        let b = self.get_bucket(bucket)?;
        match status {
            VersioningStatus::Enabled => b.enable_versioning(),
            VersioningStatus::Suspended => b.suspend_versioning(),
            VersioningStatus::Unset => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Lifecycle rules.
    ///
    /// # Errors
    ///
    /// `NoSuchLifecycleConfiguration` when no rules are set.
    pub fn get_lifecycle(&self, bucket: &str) -> S3ServiceResult<Vec<LifecycleRule>> {
        self.get_bucket(bucket)?
            .lifecycle
            .read()
            .clone()
            .filter(|rules| !rules.is_empty())
            .ok_or(S3ServiceError::NoSuchLifecycleConfiguration)
    }

    /// Replace the lifecycle rules.
    pub fn set_lifecycle(&self, bucket: &str, rules: Vec<LifecycleRule>) -> S3ServiceResult<()> {
        let b = self.get_bucket(bucket)?;
        debug!(bucket, rules = rules.len(), "lifecycle rules replaced");
        *b.lifecycle.write() = Some(rules);
        Ok(())
    }

    /// Remove all lifecycle rules.
    pub fn delete_lifecycle(&self, bucket: &str) -> S3ServiceResult<()> {
        *self.get_bucket(bucket)?.lifecycle.write() = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Policy
    // -----------------------------------------------------------------------

    /// The policy document as stored.
    ///
    /// # Errors
    ///
    /// `NoSuchBucketPolicy` when no policy is set.
    pub fn get_policy(&self, bucket: &str) -> S3ServiceResult<Bytes> {
        self.get_bucket(bucket)?
            .policy
            .read()
            .clone()
            .ok_or(S3ServiceError::NoSuchBucketPolicy)
    }

    /// Store a policy document verbatim.
    pub fn set_policy(&self, bucket: &str, policy: Bytes) -> S3ServiceResult<()> {
        *self.get_bucket(bucket)?.policy.write() = Some(policy);
        Ok(())
    }

    /// Remove the policy document.
    pub fn delete_policy(&self, bucket: &str) -> S3ServiceResult<()> {
        *self.get_bucket(bucket)?.policy.write() = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Website
    // -----------------------------------------------------------------------

    /// The website configuration as stored.
    ///
    /// # Errors
    ///
    /// `NoSuchWebsiteConfiguration` when none is set.
    pub fn get_website(&self, bucket: &str) -> S3ServiceResult<Bytes> {
        self.get_bucket(bucket)?
            .website
            .read()
            .clone()
            .ok_or(S3ServiceError::NoSuchWebsiteConfiguration)
    }

    /// Store a website configuration verbatim.
    pub fn set_website(&self, bucket: &str, website: Bytes) -> S3ServiceResult<()> {
        *self.get_bucket(bucket)?.website.write() = Some(website);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // ACL
    // -----------------------------------------------------------------------

    /// The bucket ACL.
    pub fn get_bucket_acl(&self, bucket: &str) -> S3ServiceResult<Acl> {
        Ok(self.get_bucket(bucket)?.acl.read().clone())
    }

    /// Replace the bucket ACL.
    pub fn set_bucket_acl(&self, bucket: &str, acl: Acl) -> S3ServiceResult<()> {
        *self.get_bucket(bucket)?.acl.write() = acl;
        Ok(())
    }
}
