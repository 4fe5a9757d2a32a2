//! Store-level error type.
//!
//! [`S3ServiceError`] is what every store operation returns on failure. The
//! dispatcher turns it into a wire [`S3Error`] through the [`From`] impl,
//! which picks the error code, HTTP status and the `<BucketName>` /
//! `<Resource>` fields of the rendered body.
//!
//! ```
//! use s3emu_core::error::{ErrorCategory, S3ServiceError};
//! use s3emu_model::{S3Error, S3ErrorCode};
//!
//! let err = S3ServiceError::NoSuchBucket {
//!     bucket: "my-bucket".to_owned(),
//! };
//! assert_eq!(err.category(), ErrorCategory::NotFound);
//! let s3_err: S3Error = err.into();
//! assert_eq!(s3_err.code, S3ErrorCode::NoSuchBucket);
//! ```

use s3emu_model::{S3Error, S3ErrorCode};

/// Coarse classification of a failure, used to decide whether it becomes a
/// protocol response or escapes the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A bucket, key, version, upload or bucket sub-resource is absent.
    NotFound,
    /// The request clashes with current state.
    Conflict,
    /// The request itself is malformed or unsupported.
    InvalidRequest,
    /// Multipart completion listed parts out of order.
    OrderingViolation,
    /// The method and sub-resource combination is not routed.
    NotImplemented,
    /// An unexpected failure inside the emulator.
    Internal,
}

impl ErrorCategory {
    /// Whether the dispatcher answers this category with an error body.
    #[must_use]
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::NotImplemented)
    }
}

/// Store error type.
#[derive(Debug, thiserror::Error)]
pub enum S3ServiceError {
    // -----------------------------------------------------------------------
    // Bucket errors
    // -----------------------------------------------------------------------
    /// The specified bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The bucket name is already taken.
    #[error("The requested bucket name is not available: {bucket}")]
    BucketAlreadyExists {
        /// The bucket name that already exists.
        bucket: String,
    },

    /// The bucket still owns objects.
    #[error("The bucket you tried to delete is not empty: {bucket}")]
    BucketNotEmpty {
        /// The bucket name that is not empty.
        bucket: String,
    },

    // -----------------------------------------------------------------------
    // Object / key errors
    // -----------------------------------------------------------------------
    /// The specified key does not exist.
    #[error("The specified key does not exist: {key}")]
    NoSuchKey {
        /// The key that was not found.
        key: String,
    },

    /// The specified version does not exist.
    #[error("The specified version does not exist: key={key}, version_id={version_id}")]
    NoSuchVersion {
        /// The key for the version.
        key: String,
        /// The version ID that was not found.
        version_id: String,
    },

    // -----------------------------------------------------------------------
    // Multipart errors
    // -----------------------------------------------------------------------
    /// The specified multipart upload does not exist.
    #[error("The specified multipart upload does not exist: {upload_id}")]
    NoSuchUpload {
        /// The upload ID that was not found.
        upload_id: String,
    },

    /// The list of parts was not in ascending order.
    #[error("The list of parts was not in ascending order")]
    InvalidPartOrder,

    /// A listed part was never uploaded or its ETag does not match.
    #[error("One or more of the specified parts could not be found: part {part_number}")]
    InvalidPart {
        /// The offending part number.
        part_number: u32,
    },

    // -----------------------------------------------------------------------
    // Request errors
    // -----------------------------------------------------------------------
    /// An argument in a header, query parameter or body is not acceptable.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// The request cannot be served as asked.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// The requested range cannot be satisfied.
    #[error("The requested range is not satisfiable")]
    InvalidRange,

    /// An XML request body is not well-formed.
    #[error("The XML you provided was not well-formed or did not validate against our published schema")]
    MalformedXml,

    // -----------------------------------------------------------------------
    // Bucket sub-resource errors
    // -----------------------------------------------------------------------
    /// No lifecycle rules are set.
    #[error("The lifecycle configuration does not exist")]
    NoSuchLifecycleConfiguration,

    /// No bucket policy is set.
    #[error("The bucket policy does not exist")]
    NoSuchBucketPolicy,

    /// No website configuration is set.
    #[error("The specified bucket does not have a website configuration")]
    NoSuchWebsiteConfiguration,

    // -----------------------------------------------------------------------
    // Routing / internal
    // -----------------------------------------------------------------------
    /// The method and sub-resource combination has no handler.
    #[error("Not implemented: {detail}")]
    NotImplemented {
        /// The unrouted combination.
        detail: String,
    },

    /// An internal error.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl S3ServiceError {
    /// Classify this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoSuchBucket { .. }
            | Self::NoSuchKey { .. }
            | Self::NoSuchVersion { .. }
            | Self::NoSuchUpload { .. }
            | Self::NoSuchLifecycleConfiguration
            | Self::NoSuchBucketPolicy
            | Self::NoSuchWebsiteConfiguration => ErrorCategory::NotFound,
            Self::BucketAlreadyExists { .. } | Self::BucketNotEmpty { .. } => {
                ErrorCategory::Conflict
            }
            Self::InvalidPart { .. }
            | Self::InvalidArgument { .. }
            | Self::InvalidRequest { .. }
            | Self::InvalidRange
            | Self::MalformedXml => ErrorCategory::InvalidRequest,
            Self::InvalidPartOrder => ErrorCategory::OrderingViolation,
            Self::NotImplemented { .. } => ErrorCategory::NotImplemented,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Convert this error into a wire [`S3Error`].
    #[must_use]
    pub fn into_s3_error(self) -> S3Error {
        S3Error::from(self)
    }
}

impl From<S3ServiceError> for S3Error {
    fn from(err: S3ServiceError) -> Self {
        let message = err.to_string();
        let error = S3Error::with_message(error_code(&err), message);
        match err {
            S3ServiceError::NoSuchBucket { bucket }
            | S3ServiceError::BucketAlreadyExists { bucket } => {
                error.with_resource(bucket.clone()).with_bucket_name(bucket)
            }
            S3ServiceError::BucketNotEmpty { bucket } => error.with_bucket_name(bucket),
            S3ServiceError::NoSuchKey { key } => error.with_resource(key),
            S3ServiceError::NoSuchVersion { version_id, .. } => error.with_resource(version_id),
            S3ServiceError::NoSuchUpload { upload_id } => error.with_resource(upload_id),
            S3ServiceError::Internal(source) => {
                S3Error::with_message(S3ErrorCode::InternalError, source.to_string())
            }
            _ => error,
        }
    }
}

/// Map an [`S3ServiceError`] variant to the corresponding [`S3ErrorCode`].
fn error_code(err: &S3ServiceError) -> S3ErrorCode {
    match err {
        S3ServiceError::NoSuchBucket { .. } => S3ErrorCode::NoSuchBucket,
        S3ServiceError::BucketAlreadyExists { .. } => S3ErrorCode::BucketAlreadyExists,
        S3ServiceError::BucketNotEmpty { .. } => S3ErrorCode::BucketNotEmpty,
        S3ServiceError::NoSuchKey { .. } => S3ErrorCode::NoSuchKey,
        S3ServiceError::NoSuchVersion { .. } => S3ErrorCode::NoSuchVersion,
        S3ServiceError::NoSuchUpload { .. } => S3ErrorCode::NoSuchUpload,
        S3ServiceError::InvalidPartOrder => S3ErrorCode::InvalidPartOrder,
        S3ServiceError::InvalidPart { .. } => S3ErrorCode::InvalidPart,
        S3ServiceError::InvalidArgument { .. } => S3ErrorCode::InvalidArgument,
        S3ServiceError::InvalidRequest { .. } => S3ErrorCode::InvalidRequest,
        S3ServiceError::InvalidRange => S3ErrorCode::InvalidRange,
        S3ServiceError::MalformedXml => S3ErrorCode::MalformedXML,
        S3ServiceError::NoSuchLifecycleConfiguration => S3ErrorCode::NoSuchLifecycleConfiguration,
        S3ServiceError::NoSuchBucketPolicy => S3ErrorCode::NoSuchBucketPolicy,
        S3ServiceError::NoSuchWebsiteConfiguration => S3ErrorCode::NoSuchWebsiteConfiguration,
        S3ServiceError::NotImplemented { .. } => S3ErrorCode::NotImplemented,
        S3ServiceError::Internal(_) => S3ErrorCode::InternalError,
    }
}

/// Convenience result type for store operations.
pub type S3ServiceResult<T> = Result<T, S3ServiceError>;
