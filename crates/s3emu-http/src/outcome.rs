//! Per-family operation results and their wire shapes.
//!
//! Handlers return a tagged [`Outcome`]; [`IntoS3Response`] turns each
//! variant into exactly one status, header set and body. The match is
//! exhaustive, so every new variant must decide its response shape.

use bytes::Bytes;
use http::StatusCode;
use s3emu_core::state::{S3Object, UploadPart};
use s3emu_model::input::LifecycleConfiguration;
use s3emu_model::output::{
    AccessControlPolicy, CompleteMultipartUploadResult, CopyResult, DeleteResult,
    InitiateMultipartUploadResult, ListAllMyBucketsResult, ListBucketResult,
    ListMultipartUploadsResult, ListPartsResult, ListVersionsResult, PostResponse,
};
use s3emu_model::types::VersioningStatus;
use s3emu_xml::{S3Serialize, XmlError, text_to_xml, to_xml};

use crate::response::{S3Response, set_object_headers, set_version_header};

/// Conversion of an operation result into the response envelope.
pub trait IntoS3Response {
    /// Render this result.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if a response document cannot be serialized.
    fn into_s3_response(self) -> Result<S3Response, XmlError>;
}

/// Results of service- and bucket-scoped operations.
#[derive(Debug)]
pub enum BucketOutcome {
    /// All buckets.
    Buckets(ListAllMyBucketsResult),
    /// The bucket exists.
    Exists,
    /// In-progress multipart uploads.
    Uploads(ListMultipartUploadsResult),
    /// The bucket region.
    Location(String),
    /// Lifecycle rules.
    Lifecycle(LifecycleConfiguration),
    /// Versioning mode, for both the read and the echoed write.
    Versioning(VersioningStatus),
    /// Stored policy document.
    Policy(Bytes),
    /// Stored website configuration.
    Website(Bytes),
    /// Bucket ACL.
    Acl(AccessControlPolicy),
    /// Version listing.
    Versions(ListVersionsResult),
    /// Object listing.
    Objects(ListBucketResult),
    /// A sub-resource was replaced.
    Updated,
    /// The bucket policy was replaced.
    PolicySet,
    /// A bucket was created (or an existing default-region bucket reused).
    Created {
        /// Value of the `Location` header.
        location: String,
    },
    /// A bucket or bucket sub-resource was removed.
    Removed,
    /// Bulk delete report.
    Deleted(DeleteResult),
    /// A browser-form upload was stored.
    Posted {
        /// Status requested by `success_action_status`.
        status: StatusCode,
        /// The stored object.
        object: S3Object,
        /// Value of the `Location` header.
        location: String,
        /// Document returned for status 201.
        document: Option<PostResponse>,
    },
}

/// Results of key-scoped operations outside multipart uploads.
#[derive(Debug)]
pub enum KeyOutcome {
    /// Object content for GET.
    Object(S3Object),
    /// Object metadata for HEAD.
    Head(S3Object),
    /// Object ACL.
    Acl(AccessControlPolicy),
    /// An object was written.
    Stored(S3Object),
    /// An object was copied.
    Copied(S3Object),
    /// The object ACL was replaced.
    AclUpdated,
    /// The current object was deleted.
    Deleted {
        /// Version ID of the delete marker, when versioning is enabled.
        delete_marker: Option<String>,
    },
    /// A specific version was deleted.
    VersionDeleted {
        /// The removed version.
        version_id: String,
    },
    /// A restore was requested.
    Restored {
        /// Whether the object had already been restored.
        already: bool,
    },
}

/// Results of multipart upload operations.
#[derive(Debug)]
pub enum MultipartOutcome {
    /// An upload was initiated.
    Initiated(InitiateMultipartUploadResult),
    /// A part was uploaded.
    PartStored(UploadPart),
    /// A part was copied from an object.
    PartCopied(UploadPart),
    /// Parts of an upload.
    Parts(ListPartsResult),
    /// An upload was assembled into an object.
    Completed {
        /// Completion document.
        result: CompleteMultipartUploadResult,
        /// Version of the assembled object.
        version_id: String,
    },
    /// An upload was cancelled.
    Aborted,
}

/// Result of any dispatched operation.
#[derive(Debug)]
pub enum Outcome {
    /// Service or bucket scope.
    Bucket(BucketOutcome),
    /// Key scope.
    Key(KeyOutcome),
    /// Multipart uploads.
    Multipart(MultipartOutcome),
}

impl From<BucketOutcome> for Outcome {
    fn from(outcome: BucketOutcome) -> Self {
        Self::Bucket(outcome)
    }
}

impl From<KeyOutcome> for Outcome {
    fn from(outcome: KeyOutcome) -> Self {
        Self::Key(outcome)
    }
}

impl From<MultipartOutcome> for Outcome {
    fn from(outcome: MultipartOutcome) -> Self {
        Self::Multipart(outcome)
    }
}

fn xml_ok<T: S3Serialize>(root: &str, value: &T) -> Result<S3Response, XmlError> {
    Ok(S3Response::xml(StatusCode::OK, to_xml(root, value)?))
}

impl IntoS3Response for BucketOutcome {
    fn into_s3_response(self) -> Result<S3Response, XmlError> {
        match self {
            Self::Buckets(result) => xml_ok("ListAllMyBucketsResult", &result),
            Self::Exists | Self::Updated => Ok(S3Response::empty(StatusCode::OK)),
            Self::Uploads(result) => xml_ok("ListMultipartUploadsResult", &result),
            Self::Location(region) => Ok(S3Response::xml(
                StatusCode::OK,
                text_to_xml("LocationConstraint", &region)?,
            )),
            Self::Lifecycle(config) => xml_ok("LifecycleConfiguration", &config),
            Self::Versioning(status) => xml_ok("VersioningConfiguration", &status),
            Self::Policy(policy) => Ok(S3Response::raw(
                StatusCode::OK,
                "application/json",
                policy,
            )),
            Self::Website(website) => Ok(S3Response::raw(
                StatusCode::OK,
                "application/xml",
                website,
            )),
            Self::Acl(policy) => xml_ok("AccessControlPolicy", &policy),
            Self::Versions(result) => xml_ok("ListVersionsResult", &result),
            Self::Objects(result) => xml_ok("ListBucketResult", &result),
            Self::PolicySet | Self::Removed => Ok(S3Response::empty(StatusCode::NO_CONTENT)),
            Self::Created { location } => {
                Ok(S3Response::empty(StatusCode::OK).with_header("location", &location))
            }
            Self::Deleted(result) => xml_ok("DeleteResult", &result),
            Self::Posted {
                status,
                object,
                location,
                document,
            } => {
                let mut resp = match document {
                    Some(doc) => S3Response::xml(status, to_xml("PostResponse", &doc)?),
                    None => S3Response::empty(status),
                };
                resp.set_header("etag", &object.etag);
                resp.set_header("location", &location);
                set_version_header(&mut resp, &object.version_id);
                Ok(resp)
            }
        }
    }
}

impl IntoS3Response for KeyOutcome {
    fn into_s3_response(self) -> Result<S3Response, XmlError> {
        match self {
            Self::Object(object) => {
                let mut resp = S3Response::empty(StatusCode::OK);
                set_object_headers(&mut resp, &object);
                resp.body = object.content;
                Ok(resp)
            }
            Self::Head(object) => {
                let mut resp = S3Response::empty(StatusCode::OK);
                set_object_headers(&mut resp, &object);
                Ok(resp)
            }
            Self::Acl(policy) => xml_ok("AccessControlPolicy", &policy),
            Self::Stored(object) => {
                let mut resp = S3Response::empty(StatusCode::OK);
                resp.set_header("etag", &object.etag);
                set_version_header(&mut resp, &object.version_id);
                Ok(resp)
            }
            Self::Copied(object) => {
                let result = CopyResult {
                    etag: object.etag.clone(),
                    last_modified: object.last_modified,
                };
                let mut resp = xml_ok("CopyObjectResult", &result)?;
                set_version_header(&mut resp, &object.version_id);
                Ok(resp)
            }
            Self::AclUpdated => Ok(S3Response::empty(StatusCode::OK)),
            Self::Deleted { delete_marker } => {
                let mut resp = S3Response::empty(StatusCode::NO_CONTENT);
                if let Some(version_id) = delete_marker {
                    resp.set_header("x-amz-delete-marker", "true");
                    resp.set_header("x-amz-version-id", &version_id);
                }
                Ok(resp)
            }
            Self::VersionDeleted { version_id } => {
                Ok(S3Response::empty(StatusCode::NO_CONTENT)
                    .with_header("x-amz-version-id", &version_id))
            }
            Self::Restored { already } => Ok(S3Response::empty(if already {
                StatusCode::OK
            } else {
                StatusCode::ACCEPTED
            })),
        }
    }
}

impl IntoS3Response for MultipartOutcome {
    fn into_s3_response(self) -> Result<S3Response, XmlError> {
        match self {
            Self::Initiated(result) => xml_ok("InitiateMultipartUploadResult", &result),
            Self::PartStored(part) => {
                Ok(S3Response::empty(StatusCode::OK).with_header("etag", &part.etag))
            }
            Self::PartCopied(part) => xml_ok(
                "CopyPartResult",
                &CopyResult {
                    etag: part.etag,
                    last_modified: part.last_modified,
                },
            ),
            Self::Parts(result) => xml_ok("ListPartsResult", &result),
            Self::Completed { result, version_id } => {
                let mut resp = xml_ok("CompleteMultipartUploadResult", &result)?;
                set_version_header(&mut resp, &version_id);
                Ok(resp)
            }
            Self::Aborted => Ok(S3Response::empty(StatusCode::NO_CONTENT)),
        }
    }
}

impl IntoS3Response for Outcome {
    fn into_s3_response(self) -> Result<S3Response, XmlError> {
        match self {
            Self::Bucket(outcome) => outcome.into_s3_response(),
            Self::Key(outcome) => outcome.into_s3_response(),
            Self::Multipart(outcome) => outcome.into_s3_response(),
        }
    }
}
