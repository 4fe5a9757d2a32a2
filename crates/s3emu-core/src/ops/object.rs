//! Object operations: write, append, read, delete, copy, ACL, restore and
//! listing.
//!
//! Writes take the bucket's `versioning` lock before its `objects` lock, so a
//! versioning toggle never interleaves with a write.

use bytes::Bytes;
use chrono::{TimeDelta, Utc};
use s3emu_model::types::{Acl, CannedAcl, DEFAULT_STORAGE_CLASS, VersioningStatus};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::acl::canned_acl;
use crate::error::{S3ServiceError, S3ServiceResult};
use crate::listing::{self, PrefixQuery};
use crate::state::{NULL_VERSION_ID, ObjectMetadata, S3Bucket, S3DeleteMarker, S3Object, VersionKind};
use crate::store::S3Store;
use crate::utils::{CopySource, generate_version_id};

/// Attributes applied to a freshly written object.
#[derive(Debug, Clone, TypedBuilder)]
pub struct WriteOptions {
    /// Storage class of the new object.
    #[builder(default = DEFAULT_STORAGE_CLASS.to_owned(), setter(into))]
    pub storage_class: String,
    /// Metadata of the new object.
    #[builder(default)]
    pub metadata: ObjectMetadata,
    /// ACL of the new object; `None` leaves the default.
    #[builder(default, setter(strip_option))]
    pub acl: Option<Acl>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Attributes applied to the destination of a copy.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CopyOptions {
    /// Storage class of the copy.
    #[builder(default = DEFAULT_STORAGE_CLASS.to_owned(), setter(into))]
    pub storage_class: String,
    /// ACL of the copy; `None` leaves the default.
    #[builder(default, setter(strip_option))]
    pub acl: Option<Acl>,
    /// Replacement metadata; `None` copies the source metadata.
    #[builder(default, setter(strip_option))]
    pub metadata: Option<ObjectMetadata>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One entry of a version listing.
#[derive(Debug, Clone)]
pub enum ListedVersion {
    /// An object version.
    Object {
        /// The version.
        object: S3Object,
        /// Whether it is the newest entry for its key.
        is_latest: bool,
    },
    /// A delete marker.
    DeleteMarker {
        /// The marker.
        marker: S3DeleteMarker,
        /// Whether it is the newest entry for its key.
        is_latest: bool,
    },
}

impl S3Store {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Create or replace an object with default attributes.
    pub fn set_key(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        storage_class: &str,
    ) -> S3ServiceResult<S3Object> {
        self.put_object(
            bucket,
            key,
            data,
            WriteOptions::builder().storage_class(storage_class).build(),
        )
    }

    /// Create or replace an object.
    ///
    /// Under Enabled versioning a new version is prepended; otherwise the
    /// object is written with the `"null"` version ID, replacing any previous
    /// `"null"` version.
    pub fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: WriteOptions,
    ) -> S3ServiceResult<S3Object> {
        let b = self.get_bucket(bucket)?;
        let stored = commit_object(&b, new_object(&b, key, data, options));
        debug!(bucket, key, version_id = %stored.version_id, size = stored.size, "object stored");
        Ok(stored)
    }

    /// Write the first chunk of a streamed upload and leave the object open
    /// for [`Self::append_to_key`].
    pub fn open_append(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: WriteOptions,
    ) -> S3ServiceResult<S3Object> {
        let b = self.get_bucket(bucket)?;
        let mut object = new_object(&b, key, data, options);
        object.append_open = true;
        let stored = commit_object(&b, object);
        debug!(bucket, key, size = stored.size, "streamed object opened");
        Ok(stored)
    }

    /// Append a chunk to an object opened with [`Self::open_append`].
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the object is absent, `InvalidRequest` if it is not
    /// open for appending.
    pub fn append_to_key(&self, bucket: &str, key: &str, data: &[u8]) -> S3ServiceResult<S3Object> {
        let b = self.get_bucket(bucket)?;
        let mut objects = b.objects.write();
        let object = objects.get_mut(key).ok_or_else(|| no_such_key(key))?;
        if !object.append_open {
            return Err(not_appendable(key));
        }
        object.append(data);
        debug!(bucket, key, chunk = data.len(), size = object.size, "appended to object");
        Ok(object.clone())
    }

    /// Finish a streamed upload.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the object is absent, `InvalidRequest` if it is not
    /// open for appending.
    pub fn close_append(&self, bucket: &str, key: &str) -> S3ServiceResult<S3Object> {
        let b = self.get_bucket(bucket)?;
        let mut objects = b.objects.write();
        let object = objects.get_mut(key).ok_or_else(|| no_such_key(key))?;
        if !object.append_open {
            return Err(not_appendable(key));
        }
        object.append_open = false;
        debug!(bucket, key, size = object.size, "streamed object closed");
        Ok(object.clone())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The latest object, or a specific version. `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` if the bucket does not exist.
    pub fn get_key(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> S3ServiceResult<Option<S3Object>> {
        let b = self.get_bucket(bucket)?;
        let objects = b.objects.read();
        Ok(match version_id {
            Some(v) => objects.get_version(key, v).cloned(),
            None => objects.get(key).cloned(),
        })
    }

    // -----------------------------------------------------------------------
    // Deletes
    // -----------------------------------------------------------------------

    /// Delete the current object.
    ///
    /// Un-versioned buckets drop the object. Versioned buckets insert a
    /// delete marker whose version ID is returned (`"null"` when suspended).
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if there is no current object.
    pub fn delete_key(&self, bucket: &str, key: &str) -> S3ServiceResult<Option<String>> {
        let b = self.get_bucket(bucket)?;
        let status = b.versioning.read();
        let mut objects = b.objects.write();
        if objects.get(key).is_none() {
            return Err(no_such_key(key));
        }

        if objects.is_versioned() {
            let version_id = if *status == VersioningStatus::Enabled {
                generate_version_id()
            } else {
                NULL_VERSION_ID.to_owned()
            };
            objects.insert_delete_marker(key, version_id.clone(), &b.owner);
            Ok(Some(version_id))
        } else {
            objects.remove(key);
            debug!(bucket, key, "object deleted");
            Ok(None)
        }
    }

    /// Permanently remove one version (object or delete marker).
    ///
    /// # Errors
    ///
    /// `NoSuchVersion` if the key has no such version.
    pub fn delete_key_version(&self, bucket: &str, key: &str, version_id: &str) -> S3ServiceResult<()> {
        let b = self.get_bucket(bucket)?;
        let _status = b.versioning.read();
        b.objects
            .write()
            .delete_version(key, version_id)
            .map(|_| debug!(bucket, key, version_id, "object version deleted"))
            .ok_or_else(|| S3ServiceError::NoSuchVersion {
                key: key.to_owned(),
                version_id: version_id.to_owned(),
            })
    }

    // -----------------------------------------------------------------------
    // Copy
    // -----------------------------------------------------------------------

    /// Copy an object. The copy shares no mutable state with the source.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` / `NoSuchVersion` if the source is absent, `NoSuchBucket`
    /// if either bucket is.
    pub fn copy_key(
        &self,
        source: &CopySource,
        dst_bucket: &str,
        dst_key: &str,
        options: CopyOptions,
    ) -> S3ServiceResult<S3Object> {
        let src = self.read_source(source)?;
        let b = self.get_bucket(dst_bucket)?;

        let mut object = S3Object::new(dst_key, src.content.clone());
        object.storage_class = options.storage_class;
        object.acl = options.acl;
        object.metadata = options.metadata.unwrap_or(src.metadata);
        object.owner = b.owner.clone();

        let stored = commit_object(&b, object);
        debug!(
            src_bucket = %source.bucket,
            src_key = %source.key,
            bucket = dst_bucket,
            key = dst_key,
            "object copied"
        );
        Ok(stored)
    }

    /// Read the object a copy source points at.
    pub(crate) fn read_source(&self, source: &CopySource) -> S3ServiceResult<S3Object> {
        self.get_key(&source.bucket, &source.key, source.version_id.as_deref())?
            .ok_or_else(|| match &source.version_id {
                Some(version_id) => S3ServiceError::NoSuchVersion {
                    key: source.key.clone(),
                    version_id: version_id.clone(),
                },
                None => no_such_key(&source.key),
            })
    }

    // -----------------------------------------------------------------------
    // ACL / restore
    // -----------------------------------------------------------------------

    /// The object ACL, defaulting to the owner-only private ACL.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the object is absent.
    pub fn get_key_acl(&self, bucket: &str, key: &str, version_id: Option<&str>) -> S3ServiceResult<Acl> {
        let object = self
            .get_key(bucket, key, version_id)?
            .ok_or_else(|| no_such_key(key))?;
        Ok(object
            .acl
            .unwrap_or_else(|| canned_acl(CannedAcl::Private, &object.owner)))
    }

    /// Replace the ACL of the current object.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the object is absent.
    pub fn set_key_acl(&self, bucket: &str, key: &str, acl: Acl) -> S3ServiceResult<()> {
        let b = self.get_bucket(bucket)?;
        let mut objects = b.objects.write();
        let object = objects.get_mut(key).ok_or_else(|| no_such_key(key))?;
        object.acl = Some(acl);
        Ok(())
    }

    /// Make a restored copy available for `days` days.
    ///
    /// Returns `true` if the object had already been restored before.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the object is absent, `InvalidArgument` if the expiry
    /// date is out of range.
    pub fn restore_key(&self, bucket: &str, key: &str, days: u32) -> S3ServiceResult<bool> {
        let expiry = TimeDelta::try_days(i64::from(days))
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .ok_or_else(|| S3ServiceError::InvalidArgument {
                message: format!("restore days out of range: {days}"),
            })?;

        let b = self.get_bucket(bucket)?;
        let mut objects = b.objects.write();
        let object = objects.get_mut(key).ok_or_else(|| no_such_key(key))?;
        let already_restored = object.restore_expiry.is_some();
        object.restore_expiry = Some(expiry);
        debug!(bucket, key, days, already_restored, "object restored");
        Ok(already_restored)
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Current objects grouped by prefix and delimiter.
    pub fn prefix_query(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> S3ServiceResult<PrefixQuery<S3Object>> {
        let b = self.get_bucket(bucket)?;
        let objects = b.objects.read();
        Ok(listing::prefix_query(
            objects.current_objects().map(|(k, o)| (k, o.clone())),
            prefix,
            delimiter,
        ))
    }

    /// Every version and delete marker grouped by prefix and delimiter.
    pub fn list_versions(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> S3ServiceResult<PrefixQuery<ListedVersion>> {
        let b = self.get_bucket(bucket)?;
        let objects = b.objects.read();
        let entries = objects.all_versions().map(|(k, v)| {
            let entry = match v.version {
                VersionKind::Object(o) => ListedVersion::Object {
                    object: o.clone(),
                    is_latest: v.is_latest,
                },
                VersionKind::DeleteMarker(dm) => ListedVersion::DeleteMarker {
                    marker: dm.clone(),
                    is_latest: v.is_latest,
                },
            };
            (k, entry)
        });
        Ok(listing::prefix_query(entries, prefix, delimiter))
    }
}

/// Build an object owned by the bucket owner.
fn new_object(bucket: &S3Bucket, key: &str, data: Bytes, options: WriteOptions) -> S3Object {
    let mut object = S3Object::new(key, data);
    object.storage_class = options.storage_class;
    object.metadata = options.metadata;
    object.acl = options.acl;
    object.owner = bucket.owner.clone();
    object
}

/// Assign the version ID and store the object.
pub(crate) fn commit_object(bucket: &S3Bucket, mut object: S3Object) -> S3Object {
    let status = bucket.versioning.read();
    let mut objects = bucket.objects.write();
    object.version_id = if *status == VersioningStatus::Enabled {
        generate_version_id()
    } else {
        NULL_VERSION_ID.to_owned()
    };
    objects.put(object.clone());
    object
}

fn no_such_key(key: &str) -> S3ServiceError {
    S3ServiceError::NoSuchKey {
        key: key.to_owned(),
    }
}

fn not_appendable(key: &str) -> S3ServiceError {
    S3ServiceError::InvalidRequest {
        message: format!("object is not open for appending: {key}"),
    }
}
