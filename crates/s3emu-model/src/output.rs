//! Typed response documents rendered to XML by `s3emu-xml`.

use chrono::{DateTime, Utc};

use crate::types::{Acl, Owner};

/// `<Bucket>` entry of a bucket listing.
#[derive(Debug, Clone)]
pub struct BucketEntry {
    pub name: String,
    pub creation_date: DateTime<Utc>,
}

/// `GET /` response.
#[derive(Debug, Clone, Default)]
pub struct ListAllMyBucketsResult {
    pub owner: Owner,
    pub buckets: Vec<BucketEntry>,
}

/// `<Contents>` entry of an object listing.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
    pub size: u64,
    pub storage_class: String,
    pub owner: Owner,
}

/// `GET /bucket` response.
#[derive(Debug, Clone, Default)]
pub struct ListBucketResult {
    pub name: String,
    pub prefix: String,
    pub delimiter: Option<String>,
    pub max_keys: usize,
    pub is_truncated: bool,
    pub contents: Vec<ObjectEntry>,
    /// Rendered only when a delimiter was supplied.
    pub common_prefixes: Vec<String>,
}

/// One entry of a version listing.
#[derive(Debug, Clone)]
pub enum VersionEntry {
    /// An object version.
    Version {
        object: ObjectEntry,
        version_id: String,
        is_latest: bool,
    },
    /// A delete marker.
    DeleteMarker {
        key: String,
        version_id: String,
        is_latest: bool,
        last_modified: DateTime<Utc>,
        owner: Owner,
    },
}

/// `GET /bucket?versions` response.
#[derive(Debug, Clone, Default)]
pub struct ListVersionsResult {
    pub name: String,
    pub prefix: String,
    pub key_marker: String,
    pub version_id_marker: String,
    pub delimiter: Option<String>,
    pub max_keys: usize,
    pub is_truncated: bool,
    pub entries: Vec<VersionEntry>,
    pub common_prefixes: Vec<String>,
}

/// `POST ?uploads` response.
#[derive(Debug, Clone)]
pub struct InitiateMultipartUploadResult {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
}

/// `POST ?uploadId` response.
#[derive(Debug, Clone)]
pub struct CompleteMultipartUploadResult {
    pub location: String,
    pub bucket: String,
    pub key: String,
    pub etag: String,
}

/// `<Part>` entry of a part listing.
#[derive(Debug, Clone)]
pub struct PartEntry {
    pub part_number: u32,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
    pub size: u64,
}

/// `GET key?uploadId` response.
#[derive(Debug, Clone)]
pub struct ListPartsResult {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub storage_class: String,
    pub initiator: Owner,
    pub owner: Owner,
    pub part_number_marker: u32,
    pub next_part_number_marker: u32,
    pub max_parts: usize,
    pub is_truncated: bool,
    pub parts: Vec<PartEntry>,
}

/// `<Upload>` entry of an upload listing.
#[derive(Debug, Clone)]
pub struct UploadEntry {
    pub key: String,
    pub upload_id: String,
    pub initiator: Owner,
    pub owner: Owner,
    pub storage_class: String,
    pub initiated: DateTime<Utc>,
}

/// `GET /bucket?uploads` response.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsResult {
    pub bucket: String,
    pub key_marker: String,
    pub upload_id_marker: String,
    pub prefix: Option<String>,
    pub max_uploads: usize,
    pub is_truncated: bool,
    pub uploads: Vec<UploadEntry>,
}

/// Body of a successful object or part copy.
#[derive(Debug, Clone)]
pub struct CopyResult {
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

/// `<Error>` entry of a bulk delete result.
#[derive(Debug, Clone)]
pub struct DeleteError {
    pub key: String,
    pub code: String,
    pub message: String,
}

/// `POST /bucket?delete` response.
#[derive(Debug, Clone, Default)]
pub struct DeleteResult {
    pub deleted: Vec<String>,
    pub errors: Vec<DeleteError>,
}

/// `GET ?acl` response.
#[derive(Debug, Clone, Default)]
pub struct AccessControlPolicy {
    pub owner: Owner,
    pub acl: Acl,
}

/// Body of a form upload answered with `success_action_status=201`.
#[derive(Debug, Clone)]
pub struct PostResponse {
    pub location: String,
    pub bucket: String,
    pub key: String,
    pub etag: String,
}
