//! In-memory state: the bucket namespace, buckets, objects and uploads.

pub mod bucket;
pub mod keystore;
pub mod multipart;
pub mod object;
pub mod service;

pub use bucket::S3Bucket;
pub use keystore::{ObjectStore, VersionKind, VersionRef};
pub use multipart::{MultipartUpload, UploadPart};
pub use object::{NULL_VERSION_ID, ObjectMetadata, ObjectVersion, S3DeleteMarker, S3Object};
pub use service::S3ServiceState;
