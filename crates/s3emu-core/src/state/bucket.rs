//! Bucket state.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use s3emu_model::types::{Acl, CannedAcl, LifecycleRule, Owner, VersioningStatus};
use tracing::debug;

use super::keystore::ObjectStore;
use super::multipart::MultipartUpload;
use crate::acl::canned_acl;

/// A bucket with its objects, pending uploads and sub-resource configuration.
///
/// Lock order is `versioning` before `objects`; every path that needs both
/// takes them in that order.
pub struct S3Bucket {
    /// Bucket name.
    pub name: String,
    /// Region the bucket was created in.
    pub region: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
    /// The bucket owner.
    pub owner: Owner,

    // -- object storage --
    /// Object key storage (un-versioned or versioned).
    pub objects: RwLock<ObjectStore>,
    /// In-progress multipart uploads, keyed by upload ID.
    pub multipart_uploads: DashMap<String, MultipartUpload>,

    // -- versioning --
    /// Bucket versioning status.
    pub versioning: RwLock<VersioningStatus>,

    // -- configurations --
    /// Lifecycle rules, `None` until first set.
    pub lifecycle: RwLock<Option<Vec<LifecycleRule>>>,
    /// Policy document, stored as received.
    pub policy: RwLock<Option<Bytes>>,
    /// Website configuration, stored as received.
    pub website: RwLock<Option<Bytes>>,
    /// Bucket ACL.
    pub acl: RwLock<Acl>,
}

impl std::fmt::Debug for S3Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Bucket")
            .field("name", &self.name)
            .field("region", &self.region)
            .field("creation_date", &self.creation_date)
            .field("versioning", &*self.versioning.read())
            .finish_non_exhaustive()
    }
}

impl S3Bucket {
    /// Create an empty bucket with a private ACL.
    #[must_use]
    pub fn new(name: String, region: String, owner: Owner) -> Self {
        let acl = canned_acl(CannedAcl::Private, &owner);
        Self {
            name,
            region,
            creation_date: Utc::now(),
            owner,
            objects: RwLock::new(ObjectStore::default()),
            multipart_uploads: DashMap::new(),
            versioning: RwLock::new(VersioningStatus::default()),
            lifecycle: RwLock::new(None),
            policy: RwLock::new(None),
            website: RwLock::new(None),
            acl: RwLock::new(acl),
        }
    }

    /// Whether the bucket holds no current objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Enable versioning, migrating the object store on first use.
    pub fn enable_versioning(&self) {
        let mut status = self.versioning.write();
        if *status != VersioningStatus::Enabled {
            debug!(bucket = %self.name, "enabling versioning");
            self.objects.write().transition_to_versioned();
            *status = VersioningStatus::Enabled;
        }
    }

    /// Suspend versioning.
    ///
    /// Histories are kept. New writes carry the `"null"` version ID and
    /// overwrite any existing `"null"` version.
    pub fn suspend_versioning(&self) {
        let mut status = self.versioning.write();
        if *status != VersioningStatus::Suspended {
            debug!(bucket = %self.name, "suspending versioning");
            self.objects.write().transition_to_versioned();
            *status = VersioningStatus::Suspended;
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use s3emu_model::types::{Grantee, Permission};

    use super::*;
    use crate::state::object::S3Object;

    fn make_bucket(name: &str) -> S3Bucket {
        S3Bucket::new(name.to_owned(), "us-east-1".to_owned(), Owner::default())
    }

    #[test]
    fn test_should_create_bucket_with_defaults() {
        let bucket = make_bucket("test-bucket");
        assert_eq!(bucket.name, "test-bucket");
        assert_eq!(bucket.region, "us-east-1");
        assert!(bucket.is_empty());
        assert_eq!(*bucket.versioning.read(), VersioningStatus::Unset);
        assert!(bucket.lifecycle.read().is_none());
        assert!(bucket.policy.read().is_none());

        let acl = bucket.acl.read();
        assert_eq!(acl.grants.len(), 1);
        assert_eq!(acl.grants[0].permissions, vec![Permission::FullControl]);
        assert_eq!(acl.grants[0].grantees, vec![Grantee::owner(&Owner::default())]);
    }

    #[test]
    fn test_should_toggle_versioning() {
        let bucket = make_bucket("v");
        bucket
            .objects
            .write()
            .put(S3Object::new("k", Bytes::from_static(b"x")));

        bucket.enable_versioning();
        assert_eq!(*bucket.versioning.read(), VersioningStatus::Enabled);
        assert!(bucket.objects.read().is_versioned());
        assert!(!bucket.is_empty());

        bucket.suspend_versioning();
        assert_eq!(*bucket.versioning.read(), VersioningStatus::Suspended);
        assert!(bucket.objects.read().is_versioned());
    }

    #[test]
    fn test_should_debug_format_bucket() {
        let bucket = make_bucket("debug-bucket");
        let debug = format!("{bucket:?}");
        assert!(debug.contains("debug-bucket"));
        assert!(debug.contains("S3Bucket"));
    }
}
