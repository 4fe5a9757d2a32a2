//! Operations the request dispatcher can route to.

/// Every backend operation selected by the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    // -- service --
    /// The ListBuckets operation.
    ListBuckets,

    // -- bucket reads --
    /// The HeadBucket operation.
    HeadBucket,
    /// The ListMultipartUploads operation.
    ListMultipartUploads,
    /// The GetBucketLocation operation.
    GetBucketLocation,
    /// The GetBucketLifecycle operation.
    GetBucketLifecycle,
    /// The GetBucketVersioning operation.
    GetBucketVersioning,
    /// The GetBucketPolicy operation.
    GetBucketPolicy,
    /// The GetBucketWebsite operation.
    GetBucketWebsite,
    /// The GetBucketAcl operation.
    GetBucketAcl,
    /// The ListObjectVersions operation.
    ListObjectVersions,
    /// The ListObjects operation.
    ListObjects,

    // -- bucket writes --
    /// The PutBucketVersioning operation.
    PutBucketVersioning,
    /// The PutBucketLifecycle operation.
    PutBucketLifecycle,
    /// The PutBucketPolicy operation.
    PutBucketPolicy,
    /// The PutBucketAcl operation.
    PutBucketAcl,
    /// The PutBucketWebsite operation.
    PutBucketWebsite,
    /// The CreateBucket operation.
    CreateBucket,
    /// The DeleteBucketPolicy operation.
    DeleteBucketPolicy,
    /// The DeleteBucketLifecycle operation.
    DeleteBucketLifecycle,
    /// The DeleteBucket operation.
    DeleteBucket,
    /// The DeleteObjects (bulk delete) operation.
    DeleteObjects,
    /// The PostObject (browser form upload) operation.
    PostObject,

    // -- object --
    /// The ListParts operation.
    ListParts,
    /// The GetObjectAcl operation.
    GetObjectAcl,
    /// The GetObject operation.
    GetObject,
    /// The UploadPart operation.
    UploadPart,
    /// The UploadPartCopy operation.
    UploadPartCopy,
    /// The PutObjectAcl operation.
    PutObjectAcl,
    /// The CopyObject operation.
    CopyObject,
    /// The PutObject operation.
    PutObject,
    /// The HeadObject operation.
    HeadObject,
    /// The AbortMultipartUpload operation.
    AbortMultipartUpload,
    /// The DeleteObject operation.
    DeleteObject,
    /// The CreateMultipartUpload operation.
    CreateMultipartUpload,
    /// The CompleteMultipartUpload operation.
    CompleteMultipartUpload,
    /// The RestoreObject operation.
    RestoreObject,
}

impl S3Operation {
    /// Returns the operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::HeadBucket => "HeadBucket",
            Self::ListMultipartUploads => "ListMultipartUploads",
            Self::GetBucketLocation => "GetBucketLocation",
            Self::GetBucketLifecycle => "GetBucketLifecycle",
            Self::GetBucketVersioning => "GetBucketVersioning",
            Self::GetBucketPolicy => "GetBucketPolicy",
            Self::GetBucketWebsite => "GetBucketWebsite",
            Self::GetBucketAcl => "GetBucketAcl",
            Self::ListObjectVersions => "ListObjectVersions",
            Self::ListObjects => "ListObjects",
            Self::PutBucketVersioning => "PutBucketVersioning",
            Self::PutBucketLifecycle => "PutBucketLifecycle",
            Self::PutBucketPolicy => "PutBucketPolicy",
            Self::PutBucketAcl => "PutBucketAcl",
            Self::PutBucketWebsite => "PutBucketWebsite",
            Self::CreateBucket => "CreateBucket",
            Self::DeleteBucketPolicy => "DeleteBucketPolicy",
            Self::DeleteBucketLifecycle => "DeleteBucketLifecycle",
            Self::DeleteBucket => "DeleteBucket",
            Self::DeleteObjects => "DeleteObjects",
            Self::PostObject => "PostObject",
            Self::ListParts => "ListParts",
            Self::GetObjectAcl => "GetObjectAcl",
            Self::GetObject => "GetObject",
            Self::UploadPart => "UploadPart",
            Self::UploadPartCopy => "UploadPartCopy",
            Self::PutObjectAcl => "PutObjectAcl",
            Self::CopyObject => "CopyObject",
            Self::PutObject => "PutObject",
            Self::HeadObject => "HeadObject",
            Self::AbortMultipartUpload => "AbortMultipartUpload",
            Self::DeleteObject => "DeleteObject",
            Self::CreateMultipartUpload => "CreateMultipartUpload",
            Self::CompleteMultipartUpload => "CompleteMultipartUpload",
            Self::RestoreObject => "RestoreObject",
        }
    }
}

impl std::fmt::Display for S3Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
