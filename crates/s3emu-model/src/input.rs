//! Typed request bodies parsed from XML.

use crate::types::LifecycleRule;

/// One `<Part>` entry of a `CompleteMultipartUpload` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// Part number as it appeared in the body.
    pub part_number: u32,
    /// ETag supplied by the client.
    pub etag: String,
}

/// `CompleteMultipartUpload` body, parts kept in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedMultipartUpload {
    /// Parts in the order they appeared in the request.
    pub parts: Vec<CompletedPart>,
}

/// An `<Object>` entry of a bulk delete body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentifier {
    /// Key to delete.
    pub key: String,
    /// Optional version to delete.
    pub version_id: Option<String>,
}

/// Bulk delete (`POST /?delete`) body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delete {
    /// Report only failures when set.
    pub quiet: bool,
    /// Keys to remove.
    pub objects: Vec<ObjectIdentifier>,
}

/// `PUT ?versioning` body. `status` holds the raw `<Status>` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersioningConfiguration {
    /// The `<Status>` text, if present.
    pub status: Option<String>,
}

/// Lifecycle document, used both as `PUT ?lifecycle` body and `GET ?lifecycle` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleConfiguration {
    /// Rules in document order.
    pub rules: Vec<LifecycleRule>,
}

/// `POST ?restore` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreRequest {
    /// Number of days the restored copy stays available.
    pub days: u32,
}

/// Optional `CreateBucket` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBucketConfiguration {
    /// Requested region.
    pub location_constraint: Option<String>,
}
