//! Request routing: addressing resolution and operation identification.
//!
//! The [`S3Router`] maps a request to an [`S3Operation`] by examining:
//!
//! - The HTTP method (GET, PUT, DELETE, POST, HEAD)
//! - Whether a bucket name is present (from the Host header or the path)
//! - Whether an object key is present
//! - The sub-resource marker in the query string (`?acl`, `?uploads`, ...)
//! - The `x-amz-copy-source` header, which turns a PUT into a copy
//!
//! Virtual hosting is supported for both the configured domain
//! (`mybucket.s3.localhost`) and AWS host names
//! (`mybucket.s3-eu-west-1.amazonaws.com`). The region encoded in the host,
//! if any, is extracted with the configured host pattern.

use http::Method;
use percent_encoding::percent_decode_str;
use regex::Regex;
use s3emu_core::S3Config;
use s3emu_model::error::S3Error;
use s3emu_model::operations::S3Operation;
use tracing::debug;

use crate::request::S3Request;

const COPY_SOURCE_HEADER: &str = "x-amz-copy-source";

/// Pattern matching virtual-hosted AWS host names.
const AWS_VIRTUAL_HOST_PATTERN: &str =
    r"^(?P<bucket>.+)\.s3(?:[-.][a-z0-9-]+)?\.amazonaws\.com$";

/// Routing configuration.
#[derive(Debug, Clone)]
pub struct S3Router {
    /// The base domain for virtual-hosted-style requests (e.g., `s3.localhost`).
    pub domain: String,
    /// Whether to enable virtual-hosted-style bucket addressing.
    pub virtual_hosting: bool,
    region_pattern: Regex,
    aws_virtual_host: Regex,
}

/// The result of routing a request.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The resolved bucket name, if any.
    pub bucket: Option<String>,
    /// The resolved (decoded) object key, if any.
    pub key: Option<String>,
    /// The identified operation.
    pub operation: S3Operation,
    /// Region encoded in the Host header, if the host pattern matched.
    pub region: Option<String>,
}

impl RoutingContext {
    /// The bucket name, or empty for service-level operations.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.bucket.as_deref().unwrap_or_default()
    }

    /// The object key, or empty for bucket-level operations.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or_default()
    }
}

impl S3Router {
    /// Create a router.
    ///
    /// # Errors
    ///
    /// Returns the compile error if `region_pattern` is not a valid regular
    /// expression.
    pub fn new(
        domain: impl Into<String>,
        virtual_hosting: bool,
        region_pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            domain: domain.into(),
            virtual_hosting,
            region_pattern: Regex::new(region_pattern)?,
            aws_virtual_host: Regex::new(AWS_VIRTUAL_HOST_PATTERN)?,
        })
    }

    /// Create a router from the store configuration.
    ///
    /// # Errors
    ///
    /// Returns the compile error if the configured host pattern is invalid.
    pub fn from_config(config: &S3Config) -> Result<Self, regex::Error> {
        Self::new(
            config.s3_domain.clone(),
            config.s3_virtual_hosting,
            &config.region_host_pattern,
        )
    }

    /// Resolve a request to a routing context.
    ///
    /// # Errors
    ///
    /// Returns a `NotImplemented` error when the method, scope and marker
    /// combination has no operation.
    pub fn resolve(&self, req: &S3Request) -> Result<RoutingContext, S3Error> {
        let host = req.host();
        let virtual_bucket = if self.virtual_hosting {
            host.and_then(|h| self.virtual_host_bucket(h))
        } else {
            None
        };

        let (bucket, key) = if let Some(vhost_bucket) = virtual_bucket {
            // Virtual hosting: the entire path is the key.
            let raw_key = req.path.strip_prefix('/').unwrap_or(&req.path);
            let key = (!raw_key.is_empty()).then(|| decode_uri_component(raw_key));
            (Some(vhost_bucket), key)
        } else {
            parse_path(&req.path)
        };

        let operation = identify_operation(req, bucket.is_some(), key.is_some())?;
        let region = host.and_then(|h| self.host_region(h));

        debug!(
            method = %req.method,
            bucket = bucket.as_deref().unwrap_or_default(),
            key = key.as_deref().unwrap_or_default(),
            operation = %operation,
            "request routed"
        );

        Ok(RoutingContext {
            bucket,
            key,
            operation,
            region,
        })
    }

    /// The region captured by the host pattern, if it matches.
    #[must_use]
    pub fn host_region(&self, host: &str) -> Option<String> {
        self.region_pattern
            .captures(host)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
            .filter(|r| !r.is_empty())
    }

    /// Extract the bucket name from a virtual-hosted-style host (port already
    /// stripped).
    fn virtual_host_bucket(&self, host: &str) -> Option<String> {
        let suffix = format!(".{}", self.domain);
        if let Some(bucket) = host.strip_suffix(&suffix) {
            if !bucket.is_empty() {
                return Some(bucket.to_owned());
            }
        }

        self.aws_virtual_host
            .captures(host)
            .and_then(|c| c.name("bucket"))
            .map(|m| m.as_str().to_owned())
    }
}

/// Parse the URI path into an optional bucket and optional key.
///
/// Path format: `/{bucket}` or `/{bucket}/{key...}`
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    if let Some((bucket, key_raw)) = trimmed.split_once('/') {
        let key = (!key_raw.is_empty()).then(|| decode_uri_component(key_raw));
        (Some(decode_uri_component(bucket)), key)
    } else {
        (Some(decode_uri_component(trimmed)), None)
    }
}

fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

fn unrouted(req: &S3Request, scope: &str) -> S3Error {
    S3Error::not_implemented(format!(
        "{} {scope} request is not implemented: {}",
        req.method, req.path
    ))
}

/// Map method, scope and marker to an operation.
fn identify_operation(
    req: &S3Request,
    has_bucket: bool,
    has_key: bool,
) -> Result<S3Operation, S3Error> {
    match (has_bucket, has_key) {
        (false, _) if req.method == Method::GET => Ok(S3Operation::ListBuckets),
        (false, _) => Err(unrouted(req, "service")),
        (true, false) => identify_bucket_operation(req),
        (true, true) => identify_key_operation(req),
    }
}

fn identify_bucket_operation(req: &S3Request) -> Result<S3Operation, S3Error> {
    let op = match req.method {
        Method::GET => identify_bucket_get(req),
        Method::PUT => identify_bucket_put(req),
        Method::DELETE => identify_bucket_delete(req),
        Method::HEAD => S3Operation::HeadBucket,
        Method::POST => {
            if req.has_query("delete") {
                S3Operation::DeleteObjects
            } else {
                S3Operation::PostObject
            }
        }
        _ => return Err(unrouted(req, "bucket")),
    };
    Ok(op)
}

fn identify_bucket_get(req: &S3Request) -> S3Operation {
    const MARKERS: &[(&str, S3Operation)] = &[
        ("uploads", S3Operation::ListMultipartUploads),
        ("location", S3Operation::GetBucketLocation),
        ("lifecycle", S3Operation::GetBucketLifecycle),
        ("versioning", S3Operation::GetBucketVersioning),
        ("policy", S3Operation::GetBucketPolicy),
        ("website", S3Operation::GetBucketWebsite),
        ("acl", S3Operation::GetBucketAcl),
        ("versions", S3Operation::ListObjectVersions),
    ];
    first_marker(req, MARKERS).unwrap_or(S3Operation::ListObjects)
}

fn identify_bucket_put(req: &S3Request) -> S3Operation {
    const MARKERS: &[(&str, S3Operation)] = &[
        ("versioning", S3Operation::PutBucketVersioning),
        ("lifecycle", S3Operation::PutBucketLifecycle),
        ("policy", S3Operation::PutBucketPolicy),
        ("acl", S3Operation::PutBucketAcl),
        ("website", S3Operation::PutBucketWebsite),
    ];
    first_marker(req, MARKERS).unwrap_or(S3Operation::CreateBucket)
}

fn identify_bucket_delete(req: &S3Request) -> S3Operation {
    const MARKERS: &[(&str, S3Operation)] = &[
        ("policy", S3Operation::DeleteBucketPolicy),
        ("lifecycle", S3Operation::DeleteBucketLifecycle),
    ];
    first_marker(req, MARKERS).unwrap_or(S3Operation::DeleteBucket)
}

fn first_marker(req: &S3Request, markers: &[(&str, S3Operation)]) -> Option<S3Operation> {
    markers
        .iter()
        .find(|(marker, _)| req.has_query(marker))
        .map(|(_, op)| *op)
}

fn identify_key_operation(req: &S3Request) -> Result<S3Operation, S3Error> {
    let upload_id = req.query_non_empty("uploadId").is_some();
    let copy_source = req.headers.contains_key(COPY_SOURCE_HEADER);

    let op = match req.method {
        Method::GET if upload_id => S3Operation::ListParts,
        Method::GET if req.has_query("acl") => S3Operation::GetObjectAcl,
        Method::GET => S3Operation::GetObject,

        Method::PUT if upload_id && req.has_query("partNumber") => {
            if copy_source {
                S3Operation::UploadPartCopy
            } else {
                S3Operation::UploadPart
            }
        }
        Method::PUT if req.has_query("acl") => S3Operation::PutObjectAcl,
        Method::PUT if copy_source => S3Operation::CopyObject,
        Method::PUT => S3Operation::PutObject,

        Method::HEAD => S3Operation::HeadObject,

        Method::DELETE if upload_id => S3Operation::AbortMultipartUpload,
        Method::DELETE => S3Operation::DeleteObject,

        Method::POST if req.body.is_empty() && req.has_query("uploads") => {
            S3Operation::CreateMultipartUpload
        }
        Method::POST if upload_id => S3Operation::CompleteMultipartUpload,
        Method::POST if req.has_query("restore") => S3Operation::RestoreObject,

        _ => return Err(unrouted(req, "key")),
    };
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_style_router() -> S3Router {
        S3Router::from_config(&S3Config::builder().s3_virtual_hosting(false).build())
            .unwrap_or_else(|e| panic!("router: {e}"))
    }

    fn router() -> S3Router {
        S3Router::from_config(&S3Config::default()).unwrap_or_else(|e| panic!("router: {e}"))
    }

    fn route(method: Method, target: &str) -> S3Operation {
        path_style_router()
            .resolve(&S3Request::new(method, target))
            .unwrap_or_else(|e| panic!("resolve {target}: {e}"))
            .operation
    }

    // --- Addressing ---

    #[test]
    fn test_should_extract_bucket_from_virtual_host() {
        let req = S3Request::new(Method::GET, "/").with_header("host", "mybucket.s3.localhost:4566");
        let ctx = router().resolve(&req).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ctx.bucket.as_deref(), Some("mybucket"));
        assert!(ctx.key.is_none());
        assert_eq!(ctx.operation, S3Operation::ListObjects);
    }

    #[test]
    fn test_should_extract_bucket_and_key_from_virtual_host() {
        let req = S3Request::new(Method::GET, "/dir/my%20file.txt")
            .with_header("host", "mybucket.s3.localhost");
        let ctx = router().resolve(&req).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ctx.bucket.as_deref(), Some("mybucket"));
        assert_eq!(ctx.key.as_deref(), Some("dir/my file.txt"));
        assert_eq!(ctx.operation, S3Operation::GetObject);
    }

    #[test]
    fn test_should_extract_bucket_and_region_from_aws_host() {
        let req = S3Request::new(Method::PUT, "/")
            .with_header("host", "photos.s3-eu-west-1.amazonaws.com");
        let ctx = router().resolve(&req).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ctx.bucket.as_deref(), Some("photos"));
        assert_eq!(ctx.region.as_deref(), Some("eu-west-1"));
        assert_eq!(ctx.operation, S3Operation::CreateBucket);
    }

    #[test]
    fn test_should_ignore_virtual_host_when_disabled() {
        let req = S3Request::new(Method::GET, "/other/key")
            .with_header("host", "mybucket.s3.localhost");
        let ctx = path_style_router()
            .resolve(&req)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ctx.bucket.as_deref(), Some("other"));
        assert_eq!(ctx.key.as_deref(), Some("key"));
    }

    #[test]
    fn test_should_treat_trailing_slash_as_bucket_scope() {
        let ctx = path_style_router()
            .resolve(&S3Request::new(Method::GET, "/mybucket/"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(ctx.bucket(), "mybucket");
        assert_eq!(ctx.key(), "");
        assert_eq!(ctx.operation, S3Operation::ListObjects);
    }

    #[test]
    fn test_should_not_find_region_in_local_host() {
        assert!(router().host_region("s3.localhost").is_none());
        assert_eq!(
            router().host_region("b.s3-us-west-2.amazonaws.com").as_deref(),
            Some("us-west-2")
        );
    }

    // --- Service / bucket scope ---

    #[test]
    fn test_should_route_bucket_reads() {
        let cases = [
            ("/", S3Operation::ListBuckets),
            ("/b?uploads", S3Operation::ListMultipartUploads),
            ("/b?location", S3Operation::GetBucketLocation),
            ("/b?lifecycle", S3Operation::GetBucketLifecycle),
            ("/b?versioning", S3Operation::GetBucketVersioning),
            ("/b?policy", S3Operation::GetBucketPolicy),
            ("/b?website", S3Operation::GetBucketWebsite),
            ("/b?acl", S3Operation::GetBucketAcl),
            ("/b?versions&prefix=a", S3Operation::ListObjectVersions),
            ("/b?prefix=a&delimiter=%2F", S3Operation::ListObjects),
        ];
        for (target, expected) in cases {
            assert_eq!(route(Method::GET, target), expected, "GET {target}");
        }
        assert_eq!(route(Method::HEAD, "/b"), S3Operation::HeadBucket);
    }

    #[test]
    fn test_should_route_bucket_writes() {
        let cases = [
            (Method::PUT, "/b?versioning", S3Operation::PutBucketVersioning),
            (Method::PUT, "/b?lifecycle", S3Operation::PutBucketLifecycle),
            (Method::PUT, "/b?policy", S3Operation::PutBucketPolicy),
            (Method::PUT, "/b?acl", S3Operation::PutBucketAcl),
            (Method::PUT, "/b?website", S3Operation::PutBucketWebsite),
            (Method::PUT, "/b", S3Operation::CreateBucket),
            (Method::DELETE, "/b?policy", S3Operation::DeleteBucketPolicy),
            (Method::DELETE, "/b?lifecycle", S3Operation::DeleteBucketLifecycle),
            (Method::DELETE, "/b", S3Operation::DeleteBucket),
            (Method::POST, "/b?delete", S3Operation::DeleteObjects),
            (Method::POST, "/b", S3Operation::PostObject),
        ];
        for (method, target, expected) in cases {
            assert_eq!(route(method.clone(), target), expected, "{method} {target}");
        }
    }

    // --- Key scope ---

    #[test]
    fn test_should_route_key_operations() {
        let cases = [
            (Method::GET, "/b/k?uploadId=u1", S3Operation::ListParts),
            (Method::GET, "/b/k?acl", S3Operation::GetObjectAcl),
            (Method::GET, "/b/k?versionId=v1", S3Operation::GetObject),
            (Method::PUT, "/b/k?partNumber=1&uploadId=u1", S3Operation::UploadPart),
            (Method::PUT, "/b/k?acl", S3Operation::PutObjectAcl),
            (Method::PUT, "/b/k", S3Operation::PutObject),
            (Method::HEAD, "/b/k", S3Operation::HeadObject),
            (Method::DELETE, "/b/k?uploadId=u1", S3Operation::AbortMultipartUpload),
            (Method::DELETE, "/b/k", S3Operation::DeleteObject),
            (Method::POST, "/b/k?uploads", S3Operation::CreateMultipartUpload),
            (Method::POST, "/b/k?uploadId=u1", S3Operation::CompleteMultipartUpload),
            (Method::POST, "/b/k?restore", S3Operation::RestoreObject),
        ];
        for (method, target, expected) in cases {
            assert_eq!(route(method.clone(), target), expected, "{method} {target}");
        }
    }

    #[test]
    fn test_should_route_copy_by_header() {
        let router = path_style_router();
        let copy = S3Request::new(Method::PUT, "/b/k").with_header("x-amz-copy-source", "/src/k");
        let op = router.resolve(&copy).unwrap_or_else(|e| panic!("{e}")).operation;
        assert_eq!(op, S3Operation::CopyObject);

        let part_copy = S3Request::new(Method::PUT, "/b/k?partNumber=2&uploadId=u1")
            .with_header("x-amz-copy-source", "/src/k");
        let op = router
            .resolve(&part_copy)
            .unwrap_or_else(|e| panic!("{e}"))
            .operation;
        assert_eq!(op, S3Operation::UploadPartCopy);
    }

    #[test]
    fn test_should_ignore_empty_upload_id() {
        assert_eq!(route(Method::GET, "/b/k?uploadId="), S3Operation::GetObject);
        assert_eq!(route(Method::DELETE, "/b/k?uploadId="), S3Operation::DeleteObject);
    }

    #[test]
    fn test_should_reject_unrouted_combinations() {
        let router = path_style_router();
        let cases = [
            S3Request::new(Method::POST, "/b/k"),
            S3Request::new(Method::POST, "/b/k?uploads").with_body("not empty"),
            S3Request::new(Method::PATCH, "/b"),
            S3Request::new(Method::PATCH, "/b/k"),
            S3Request::new(Method::PUT, "/"),
        ];
        for req in cases {
            let err = router
                .resolve(&req)
                .err()
                .unwrap_or_else(|| panic!("{} {} should not route", req.method, req.path));
            assert!(err.is_not_implemented());
        }
    }
}
