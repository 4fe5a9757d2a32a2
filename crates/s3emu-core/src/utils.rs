//! Shared utilities for the store.
//!
//! Provides ID generation, ETag computation, copy-source parsing and header
//! metadata extraction.

use base64::Engine;
use md5::{Digest, Md5};
use percent_encoding::percent_decode_str;
use rand::RngExt;
use uuid::Uuid;

use crate::error::S3ServiceError;
use crate::state::ObjectMetadata;

// ---------------------------------------------------------------------------
// ID generation
// ---------------------------------------------------------------------------

/// Generate a random version ID for versioned objects and delete markers.
///
/// Produces a URL-safe base64 string of 32 characters.
///
/// # Examples
///
/// ```
/// use s3emu_core::utils::generate_version_id;
///
/// let id = generate_version_id();
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
/// ```
#[must_use]
pub fn generate_version_id() -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; 24];
    rng.fill(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Generate a random upload ID for multipart uploads.
///
/// # Examples
///
/// ```
/// use s3emu_core::utils::generate_upload_id;
///
/// let id = generate_upload_id();
/// assert_eq!(id.len(), 64);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn generate_upload_id() -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; 32];
    rng.fill(&mut buf);
    hex::encode(buf)
}

/// Generate a unique request ID (UUID v4 without dashes).
///
/// # Examples
///
/// ```
/// use s3emu_core::utils::generate_request_id;
///
/// let id = generate_request_id();
/// assert_eq!(id.len(), 32);
/// ```
#[must_use]
pub fn generate_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// ---------------------------------------------------------------------------
// ETags
// ---------------------------------------------------------------------------

/// Compute the quoted MD5 ETag of `data`.
///
/// # Examples
///
/// ```
/// use s3emu_core::utils::compute_etag;
///
/// assert_eq!(compute_etag(b""), "\"d41d8cd98f00b204e9800998ecf8427e\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Md5::digest(data)))
}

/// Strip surrounding double quotes from an ETag.
#[must_use]
pub fn normalize_etag(etag: &str) -> &str {
    etag.trim().trim_matches('"')
}

// ---------------------------------------------------------------------------
// Copy source
// ---------------------------------------------------------------------------

/// Parsed `x-amz-copy-source` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    /// Source bucket.
    pub bucket: String,
    /// Source key.
    pub key: String,
    /// Source version, when `?versionId=` is present.
    pub version_id: Option<String>,
}

/// Parse an `x-amz-copy-source` header value.
///
/// Accepts `bucket/key`, `/bucket/key` and an optional `?versionId=<id>`
/// suffix. The path part is percent-decoded.
///
/// # Errors
///
/// Returns [`S3ServiceError::InvalidArgument`] if no key follows the bucket.
///
/// # Examples
///
/// ```
/// use s3emu_core::utils::parse_copy_source;
///
/// let src = parse_copy_source("/photos/2024/cat%20one.jpg?versionId=abc").unwrap();
/// assert_eq!(src.bucket, "photos");
/// assert_eq!(src.key, "2024/cat one.jpg");
/// assert_eq!(src.version_id.as_deref(), Some("abc"));
/// ```
pub fn parse_copy_source(value: &str) -> Result<CopySource, S3ServiceError> {
    let (path, query) = match value.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (value, None),
    };

    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let trimmed = decoded.trim_start_matches('/');
    let (bucket, key) = trimmed
        .split_once('/')
        .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
        .ok_or_else(|| S3ServiceError::InvalidArgument {
            message: format!("Invalid copy source: {value}"),
        })?;

    let version_id = query.and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == "versionId")
            .map(|(_, v)| v.to_owned())
    });

    Ok(CopySource {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
        version_id,
    })
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Standard content headers stored alongside user metadata.
pub const CONTENT_HEADERS: &[&str] = &[
    "cache-control",
    "content-disposition",
    "content-encoding",
    "content-language",
    "content-type",
    "expires",
];

/// Whether a (lowercase) header or form field name is object metadata.
#[must_use]
pub fn is_metadata_name(name: &str) -> bool {
    name.starts_with("x-amz-meta-") || CONTENT_HEADERS.contains(&name)
}

/// Collect object metadata from an iterator of `(name, value)` pairs.
///
/// Names are matched case-insensitively and stored lowercased.
pub fn metadata_from_pairs<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> ObjectMetadata {
    let mut metadata = ObjectMetadata::default();
    for (name, value) in pairs {
        let name = name.to_ascii_lowercase();
        if is_metadata_name(&name) {
            metadata.insert(&name, value);
        }
    }
    metadata
}

/// Collect object metadata from request headers.
///
/// Headers whose value is not valid UTF-8 are skipped.
#[must_use]
pub fn metadata_from_headers(headers: &http::HeaderMap) -> ObjectMetadata {
    metadata_from_pairs(
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?))),
    )
}
