//! Stored objects, delete markers and object metadata.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3emu_model::types::{Acl, DEFAULT_STORAGE_CLASS, Owner};

use crate::utils::compute_etag;

/// Version ID carried by objects written while versioning is not enabled.
pub const NULL_VERSION_ID: &str = "null";

// ---------------------------------------------------------------------------
// ObjectMetadata
// ---------------------------------------------------------------------------

/// String-to-string object metadata with case-insensitive keys.
///
/// Holds `x-amz-meta-*` entries together with the standard content headers
/// (`content-type`, `cache-control`, ...). Keys are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    entries: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// Insert or replace an entry.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// The stored `content-type`, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// S3Object
// ---------------------------------------------------------------------------

/// A stored object (or one version of it).
#[derive(Debug, Clone)]
pub struct S3Object {
    /// Object key.
    pub key: String,
    /// Version ID (`"null"` unless written under Enabled versioning).
    pub version_id: String,
    /// Object content.
    pub content: Bytes,
    /// Quoted MD5 of `content`.
    pub etag: String,
    /// Content length in bytes.
    pub size: u64,
    /// Last write time.
    pub last_modified: DateTime<Utc>,
    /// Storage class (`STANDARD` by default).
    pub storage_class: String,
    /// User and content metadata.
    pub metadata: ObjectMetadata,
    /// Object ACL, if one was ever set.
    pub acl: Option<Acl>,
    /// The owner of this object.
    pub owner: Owner,
    /// Expiry of a restored archive copy.
    pub restore_expiry: Option<DateTime<Utc>>,
    /// Whether a streamed upload is still appending to this object.
    pub append_open: bool,
}

impl S3Object {
    /// Create an object with fresh ETag, size and timestamp.
    #[must_use]
    pub fn new(key: impl Into<String>, content: Bytes) -> Self {
        let mut object = Self {
            key: key.into(),
            version_id: NULL_VERSION_ID.to_owned(),
            content: Bytes::new(),
            etag: String::new(),
            size: 0,
            last_modified: Utc::now(),
            storage_class: DEFAULT_STORAGE_CLASS.to_owned(),
            metadata: ObjectMetadata::default(),
            acl: None,
            owner: Owner::default(),
            restore_expiry: None,
            append_open: false,
        };
        object.set_content(content);
        object
    }

    /// Replace the content, recomputing ETag, size and last-modified.
    pub fn set_content(&mut self, content: Bytes) {
        self.etag = compute_etag(&content);
        self.size = content.len() as u64;
        self.content = content;
        self.last_modified = Utc::now();
    }

    /// Append to the content, recomputing ETag, size and last-modified.
    pub fn append(&mut self, data: &[u8]) {
        let mut buf = Vec::with_capacity(self.content.len() + data.len());
        buf.extend_from_slice(&self.content);
        buf.extend_from_slice(data);
        self.set_content(Bytes::from(buf));
    }
}

// ---------------------------------------------------------------------------
// S3DeleteMarker
// ---------------------------------------------------------------------------

/// A delete marker in a versioned bucket.
#[derive(Debug, Clone)]
pub struct S3DeleteMarker {
    /// The key this marker hides.
    pub key: String,
    /// Version ID of the marker itself.
    pub version_id: String,
    /// When the marker was created.
    pub last_modified: DateTime<Utc>,
    /// The owner of the marker.
    pub owner: Owner,
}

// ---------------------------------------------------------------------------
// ObjectVersion
// ---------------------------------------------------------------------------

/// One entry in a key's version history.
#[derive(Debug, Clone)]
pub enum ObjectVersion {
    /// A regular object version.
    Object(Box<S3Object>),
    /// A delete marker.
    DeleteMarker(S3DeleteMarker),
}

impl ObjectVersion {
    /// The key of this version.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Object(obj) => &obj.key,
            Self::DeleteMarker(dm) => &dm.key,
        }
    }

    /// The version ID of this version.
    #[must_use]
    pub fn version_id(&self) -> &str {
        match self {
            Self::Object(obj) => &obj.version_id,
            Self::DeleteMarker(dm) => &dm.version_id,
        }
    }

    /// Whether this version is a delete marker.
    #[must_use]
    pub fn is_delete_marker(&self) -> bool {
        matches!(self, Self::DeleteMarker(_))
    }

    /// The object, if this is not a delete marker.
    #[must_use]
    pub fn as_object(&self) -> Option<&S3Object> {
        match self {
            Self::Object(obj) => Some(obj),
            Self::DeleteMarker(_) => None,
        }
    }

    /// Mutable access to the object, if this is not a delete marker.
    pub fn as_object_mut(&mut self) -> Option<&mut S3Object> {
        match self {
            Self::Object(obj) => Some(obj),
            Self::DeleteMarker(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compute_etag_on_create() {
        let obj = S3Object::new("k", Bytes::from_static(b"hello"));
        assert_eq!(obj.size, 5);
        assert_eq!(obj.etag, compute_etag(b"hello"));
        assert_eq!(obj.version_id, NULL_VERSION_ID);
        assert_eq!(obj.storage_class, "STANDARD");
    }

    #[test]
    fn test_should_recompute_etag_on_append() {
        let mut obj = S3Object::new("k", Bytes::from_static(b"hel"));
        let before = obj.etag.clone();
        obj.append(b"lo");
        assert_eq!(obj.content.as_ref(), b"hello");
        assert_eq!(obj.size, 5);
        assert_ne!(obj.etag, before);
        assert_eq!(obj.etag, compute_etag(b"hello"));
    }

    #[test]
    fn test_should_treat_metadata_keys_case_insensitively() {
        let mut metadata = ObjectMetadata::default();
        metadata.insert("X-Amz-Meta-Owner", "alice");
        assert_eq!(metadata.get("x-amz-meta-owner"), Some("alice"));
        metadata.insert("x-amz-meta-owner", "bob");
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.remove("X-AMZ-META-OWNER").as_deref(), Some("bob"));
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_should_expose_version_accessors() {
        let obj = ObjectVersion::Object(Box::new(S3Object::new("a", Bytes::new())));
        assert_eq!(obj.key(), "a");
        assert!(!obj.is_delete_marker());
        assert!(obj.as_object().is_some());

        let dm = ObjectVersion::DeleteMarker(S3DeleteMarker {
            key: "a".to_owned(),
            version_id: "v1".to_owned(),
            last_modified: Utc::now(),
            owner: Owner::default(),
        });
        assert_eq!(dm.version_id(), "v1");
        assert!(dm.is_delete_marker());
        assert!(dm.as_object().is_none());
    }
}
