//! Wire-level S3 error codes and the error value rendered into `<Error>` bodies.

use std::fmt;

use http::StatusCode;

/// Error codes the emulator can put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// The bucket name is already taken in another region.
    BucketAlreadyExists,
    /// Delete was attempted on a bucket that still holds objects.
    BucketNotEmpty,
    /// Catch-all for failures that are not the client's fault.
    InternalError,
    /// A query parameter or header value was rejected.
    InvalidArgument,
    /// A completion referenced a missing part or a stale ETag.
    InvalidPart,
    /// Completion parts were not strictly ascending.
    InvalidPartOrder,
    /// The byte range cannot be satisfied.
    InvalidRange,
    /// The request is structurally unsupported.
    InvalidRequest,
    /// The request body is not the expected XML document.
    MalformedXML,
    /// NoSuchBucket.
    NoSuchBucket,
    /// NoSuchBucketPolicy.
    NoSuchBucketPolicy,
    /// NoSuchKey.
    NoSuchKey,
    /// NoSuchLifecycleConfiguration.
    NoSuchLifecycleConfiguration,
    /// NoSuchUpload.
    NoSuchUpload,
    /// NoSuchVersion.
    NoSuchVersion,
    /// NoSuchWebsiteConfiguration.
    NoSuchWebsiteConfiguration,
    /// The router has no operation for this request.
    NotImplemented,
}

impl S3ErrorCode {
    /// The `<Code>` string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::InternalError => "InternalError",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidPart => "InvalidPart",
            Self::InvalidPartOrder => "InvalidPartOrder",
            Self::InvalidRange => "InvalidRange",
            Self::InvalidRequest => "InvalidRequest",
            Self::MalformedXML => "MalformedXML",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchLifecycleConfiguration => "NoSuchLifecycleConfiguration",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::NoSuchVersion => "NoSuchVersion",
            Self::NoSuchWebsiteConfiguration => "NoSuchWebsiteConfiguration",
            Self::NotImplemented => "NotImplemented",
        }
    }

    /// HTTP status the code is sent with.
    #[must_use]
    pub fn default_status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument
            | Self::InvalidPart
            | Self::InvalidPartOrder
            | Self::InvalidRequest
            | Self::MalformedXML => StatusCode::BAD_REQUEST,
            Self::NoSuchBucket
            | Self::NoSuchBucketPolicy
            | Self::NoSuchKey
            | Self::NoSuchLifecycleConfiguration
            | Self::NoSuchUpload
            | Self::NoSuchVersion
            | Self::NoSuchWebsiteConfiguration => StatusCode::NOT_FOUND,
            Self::BucketAlreadyExists | Self::BucketNotEmpty => StatusCode::CONFLICT,
            Self::InvalidRange => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// `<Message>` used when the caller has nothing more specific.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BucketAlreadyExists => "The requested bucket name is not available",
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty",
            Self::InternalError => "We encountered an internal error. Please try again.",
            Self::InvalidArgument => "Invalid Argument",
            Self::InvalidPart => "One or more of the specified parts could not be found",
            Self::InvalidPartOrder => "The list of parts was not in ascending order",
            Self::InvalidRange => "The requested range is not satisfiable",
            Self::InvalidRequest => "Invalid Request",
            Self::MalformedXML => "The XML you provided was not well-formed",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::NoSuchBucketPolicy => "The bucket policy does not exist",
            Self::NoSuchKey => "The specified key does not exist.",
            Self::NoSuchLifecycleConfiguration => "The lifecycle configuration does not exist",
            Self::NoSuchUpload => "The specified upload does not exist",
            Self::NoSuchVersion => "The specified version does not exist.",
            Self::NoSuchWebsiteConfiguration => "The specified bucket does not have a website configuration",
            Self::NotImplemented => "A header or method you provided is not implemented",
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error on its way to the wire.
///
/// Store failures are converted into this type at the dispatcher boundary;
/// the response layer renders it as an `<Error>` document with the code's
/// status.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct S3Error {
    /// `<Code>`.
    pub code: S3ErrorCode,
    /// `<Message>`.
    pub message: String,
    /// `<Resource>`: the key, upload id or bucket the error is about.
    pub resource: Option<String>,
    /// `<BucketName>`, for bucket-scoped failures.
    pub bucket_name: Option<String>,
    /// `<RequestId>`, filled in by the dispatcher.
    pub request_id: Option<String>,
    /// Response status.
    pub status_code: StatusCode,
}

impl S3Error {
    /// An error with the code's default message.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    /// An error with a caller-supplied message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            resource: None,
            bucket_name: None,
            request_id: None,
        }
    }

    /// Set `<Resource>`.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set `<BucketName>`.
    #[must_use]
    pub fn with_bucket_name(mut self, bucket: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket.into());
        self
    }

    /// Set `<RequestId>`.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Whether this error is a routing gap rather than a protocol failure.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        self.code == S3ErrorCode::NotImplemented
    }

    /// `NoSuchBucket` naming `bucket` as both resource and bucket name.
    #[must_use]
    pub fn no_such_bucket(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self::new(S3ErrorCode::NoSuchBucket)
            .with_resource(bucket.clone())
            .with_bucket_name(bucket)
    }

    /// `InternalError` with a specific message.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }

    /// `NotImplemented` describing the unrouted request.
    #[must_use]
    pub fn not_implemented(detail: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::NotImplemented, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_not_found_codes_to_404() {
        for code in [
            S3ErrorCode::NoSuchBucket,
            S3ErrorCode::NoSuchKey,
            S3ErrorCode::NoSuchUpload,
            S3ErrorCode::NoSuchVersion,
            S3ErrorCode::NoSuchBucketPolicy,
            S3ErrorCode::NoSuchLifecycleConfiguration,
            S3ErrorCode::NoSuchWebsiteConfiguration,
        ] {
            assert_eq!(code.default_status_code(), StatusCode::NOT_FOUND, "{code}");
        }
    }

    #[test]
    fn test_should_map_conflicts_and_ranges() {
        assert_eq!(S3ErrorCode::BucketNotEmpty.default_status_code(), StatusCode::CONFLICT);
        assert_eq!(
            S3ErrorCode::InvalidRange.default_status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            S3ErrorCode::InvalidPartOrder.default_status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_should_carry_bucket_name_for_missing_bucket() {
        let err = S3Error::no_such_bucket("photos");
        assert_eq!(err.bucket_name.as_deref(), Some("photos"));
        assert_eq!(err.resource.as_deref(), Some("photos"));
        assert_eq!(err.status_code, StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "NoSuchBucket: The specified bucket does not exist");
    }

    #[test]
    fn test_should_flag_only_routing_gaps_as_not_implemented() {
        assert!(S3Error::not_implemented("PATCH /b").is_not_implemented());
        let err = S3Error::with_message(S3ErrorCode::MalformedXML, "bad body");
        assert_eq!(err.code.as_str(), "MalformedXML");
        assert!(!err.is_not_implemented());
    }
}
