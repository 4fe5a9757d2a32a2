//! In-progress multipart uploads.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3emu_model::types::{DEFAULT_STORAGE_CLASS, Owner};

use super::object::ObjectMetadata;
use crate::utils::compute_etag;

/// An in-progress multipart upload.
///
/// Parts are kept in a `BTreeMap` keyed by part number so they are always
/// enumerated in ascending order.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    /// Unique upload identifier.
    pub upload_id: String,
    /// Target object key.
    pub key: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
    /// The owner of the upload.
    pub owner: Owner,
    /// Metadata applied to the object on completion.
    pub metadata: ObjectMetadata,
    /// Uploaded parts, keyed by part number.
    pub parts: BTreeMap<u32, UploadPart>,
    /// Storage class of the completed object.
    pub storage_class: String,
}

impl MultipartUpload {
    /// Create an empty upload.
    #[must_use]
    pub fn new(upload_id: String, key: String, owner: Owner, metadata: ObjectMetadata) -> Self {
        Self {
            upload_id,
            key,
            initiated: Utc::now(),
            owner,
            metadata,
            parts: BTreeMap::new(),
            storage_class: DEFAULT_STORAGE_CLASS.to_owned(),
        }
    }

    /// Store a part, replacing any part with the same number.
    pub fn put_part(&mut self, part: UploadPart) {
        self.parts.insert(part.part_number, part);
    }

    /// Get a part by number.
    #[must_use]
    pub fn get_part(&self, part_number: u32) -> Option<&UploadPart> {
        self.parts.get(&part_number)
    }

    /// Number of uploaded parts.
    #[must_use]
    pub fn parts_count(&self) -> usize {
        self.parts.len()
    }

    /// Sum of all part sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.parts.values().map(|p| p.size).sum()
    }
}

/// One uploaded part.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Part number (1-based).
    pub part_number: u32,
    /// Part content.
    pub content: Bytes,
    /// Quoted MD5 of `content`.
    pub etag: String,
    /// Size in bytes.
    pub size: u64,
    /// When the part was uploaded.
    pub last_modified: DateTime<Utc>,
}

impl UploadPart {
    /// Create a part, computing its ETag and size.
    #[must_use]
    pub fn new(part_number: u32, content: Bytes) -> Self {
        Self {
            part_number,
            etag: compute_etag(&content),
            size: content.len() as u64,
            content,
            last_modified: Utc::now(),
        }
    }
}
