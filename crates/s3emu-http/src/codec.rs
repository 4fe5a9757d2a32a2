//! aws-chunked payload decoding.
//!
//! Signed streaming uploads wrap the object data in a chunk envelope:
//!
//! ```text
//! <hex-size>;chunk-signature=<sig>\r\n
//! <data>\r\n
//! 0;chunk-signature=<sig>\r\n
//! \r\n
//! ```
//!
//! [`decode_payload`] strips that framing, and the `aws-chunked` content
//! coding, before the body reaches the store.

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_ENCODING, HeaderMap, HeaderValue};
use s3emu_core::{S3ServiceError, S3ServiceResult};

const AWS_CHUNKED: &str = "aws-chunked";
const CONTENT_SHA256_HEADER: &str = "x-amz-content-sha256";

/// Whether the headers announce an aws-chunked body, either through
/// `Content-Encoding: aws-chunked` or a `STREAMING-*` payload hash.
#[must_use]
pub fn is_aws_chunked(headers: &HeaderMap) -> bool {
    let encoded = headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(AWS_CHUNKED));
    let streaming = headers
        .get(CONTENT_SHA256_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("STREAMING-"));
    encoded || streaming
}

/// Decode `body` if the headers announce aws-chunked framing, removing the
/// `aws-chunked` coding from `headers` so it is not stored as metadata.
///
/// # Errors
///
/// `InvalidArgument` if the chunk framing is malformed.
pub fn decode_payload(headers: &mut HeaderMap, body: &Bytes) -> S3ServiceResult<Bytes> {
    if !is_aws_chunked(headers) {
        return Ok(body.clone());
    }
    let decoded = decode_aws_chunked(body)?;
    strip_aws_chunked_encoding(headers);
    Ok(decoded)
}

/// Decode an aws-chunked body into the raw payload bytes.
///
/// # Errors
///
/// `InvalidArgument` on a missing size line, a non-hex size or truncated
/// chunk data.
pub fn decode_aws_chunked(body: &[u8]) -> S3ServiceResult<Bytes> {
    let mut output = BytesMut::with_capacity(body.len());
    let mut rest = body;

    loop {
        let (line, after_line) = split_line(rest).ok_or_else(|| malformed("missing chunk size line"))?;

        // <hex-size>[;chunk-signature=<sig>][;ext...]
        let size_field = line.split(|&b| b == b';').next().unwrap_or_default();
        let size_text = std::str::from_utf8(size_field)
            .map_err(|_| malformed("chunk size is not ASCII"))?
            .trim();
        let size = usize::from_str_radix(size_text, 16)
            .map_err(|_| malformed(&format!("invalid chunk size '{size_text}'")))?;

        if size == 0 {
            break;
        }

        let data = after_line
            .get(..size)
            .ok_or_else(|| malformed("chunk data truncated"))?;
        output.extend_from_slice(data);

        rest = after_line[size..]
            .strip_prefix(b"\r\n")
            .ok_or_else(|| malformed("missing CRLF after chunk data"))?;
    }

    Ok(output.freeze())
}

/// Remove `aws-chunked` from `Content-Encoding`, dropping the header when
/// nothing else remains.
pub fn strip_aws_chunked_encoding(headers: &mut HeaderMap) {
    let Some(value) = headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok()) else {
        return;
    };

    let remaining = value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(AWS_CHUNKED))
        .collect::<Vec<_>>()
        .join(", ");

    if remaining.is_empty() {
        headers.remove(CONTENT_ENCODING);
    } else if let Ok(value) = HeaderValue::from_str(&remaining) {
        headers.insert(CONTENT_ENCODING, value);
    }
}

/// Split at the first CRLF, returning the line and what follows it.
fn split_line(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = data.windows(2).position(|w| w == b"\r\n")?;
    Some((&data[..pos], &data[pos + 2..]))
}

fn malformed(detail: &str) -> S3ServiceError {
    S3ServiceError::InvalidArgument {
        message: format!("Malformed aws-chunked body: {detail}"),
    }
}
