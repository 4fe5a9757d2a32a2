//! The response envelope and header shaping.
//!
//! Every dispatched request produces an [`S3Response`]: a status code, a
//! header map and the body bytes. Object-bearing responses get their headers
//! from [`set_object_headers`]; failures are rendered by
//! [`error_to_response`].

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use s3emu_core::state::{NULL_VERSION_ID, S3Object};
use s3emu_model::error::S3Error;
use s3emu_model::types::DEFAULT_STORAGE_CLASS;
use s3emu_xml::{ErrorBody, error_to_xml};

/// Content type used for object bodies without a stored `Content-Type`.
pub const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

/// Header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-amz-request-id";

/// Status, headers and body of a dispatched request.
#[derive(Debug, Clone)]
pub struct S3Response {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl S3Response {
    /// An empty response with the given status.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A response carrying an XML document.
    #[must_use]
    pub fn xml(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let mut resp = Self::empty(status);
        resp.set_header("content-type", "application/xml");
        resp.body = body.into();
        resp
    }

    /// A response carrying raw bytes of the given content type.
    #[must_use]
    pub fn raw(status: StatusCode, content_type: &str, body: Bytes) -> Self {
        let mut resp = Self::empty(status);
        resp.set_header("content-type", content_type);
        resp.body = body;
        resp
    }

    /// Add a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Insert or replace a header. Names or values that are not valid HTTP
    /// are skipped.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
    }

    /// A header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Convert into an `http` response with a fully buffered body.
    #[must_use]
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Format a timestamp as an RFC 7231 HTTP date.
#[must_use]
pub fn http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Set the version header unless the version is the `"null"` one.
pub fn set_version_header(resp: &mut S3Response, version_id: &str) {
    if version_id != NULL_VERSION_ID {
        resp.set_header("x-amz-version-id", version_id);
    }
}

/// Apply the headers describing a stored object.
///
/// `Content-Length` is the object size; range handling overrides it later.
pub fn set_object_headers(resp: &mut S3Response, object: &S3Object) {
    resp.set_header("etag", &object.etag);
    resp.set_header("last-modified", &http_date(&object.last_modified));
    resp.set_header("content-length", &object.size.to_string());
    resp.set_header("accept-ranges", "bytes");

    for (name, value) in object.metadata.iter() {
        resp.set_header(name, value);
    }
    if object.metadata.content_type().is_none() {
        resp.set_header("content-type", DEFAULT_CONTENT_TYPE);
    }

    set_version_header(resp, &object.version_id);
    if object.storage_class != DEFAULT_STORAGE_CLASS {
        resp.set_header("x-amz-storage-class", &object.storage_class);
    }
    if let Some(expiry) = object.restore_expiry {
        resp.set_header(
            "x-amz-restore",
            &format!(
                "ongoing-request=\"false\", expiry-date=\"{}\"",
                http_date(&expiry)
            ),
        );
    }
}

/// Render an error as a response with an `<Error>` body.
///
/// HEAD responses carry no body, only the status and headers.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str, with_body: bool) -> S3Response {
    let mut resp = S3Response::empty(err.status_code);
    if with_body {
        let xml = error_to_xml(&ErrorBody {
            code: err.code.as_str(),
            message: &err.message,
            bucket_name: err.bucket_name.as_deref(),
            resource: err.resource.as_deref(),
            request_id,
        });
        resp = S3Response::xml(err.status_code, xml);
    }
    resp.set_header(REQUEST_ID_HEADER, request_id);
    resp
}
