//! Single byte-range resolution.
//!
//! Resolves a `Range` (or `x-amz-copy-source-range`) value such as
//! `bytes=2-5` or `bytes=-3` against a known content length. Multiple ranges
//! are not supported.

use bytes::Bytes;

use crate::error::S3ServiceError;

/// An inclusive, satisfiable byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
    /// Full content length.
    pub total: u64,
}

impl ByteRange {
    /// Number of bytes covered.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always `false`; a resolved range covers at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `Content-Range` header value, e.g. `bytes 2-5/10`.
    #[must_use]
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }

    /// The covered slice of `data` (which must be `total` bytes long).
    #[must_use]
    pub fn slice(&self, data: &Bytes) -> Bytes {
        let start = usize::try_from(self.start).unwrap_or(usize::MAX).min(data.len());
        let end = usize::try_from(self.end + 1).unwrap_or(usize::MAX).min(data.len());
        data.slice(start..end)
    }
}

/// Why a range could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// More than one range was requested.
    #[error("multiple ranges are not supported")]
    MultipleRanges,
    /// The specifier could not be parsed.
    #[error("malformed range: {0}")]
    Malformed(String),
    /// The range lies outside the content.
    #[error("range not satisfiable")]
    Unsatisfiable,
}

impl From<RangeError> for S3ServiceError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::Unsatisfiable => Self::InvalidRange,
            RangeError::MultipleRanges | RangeError::Malformed(_) => Self::InvalidRequest {
                message: err.to_string(),
            },
        }
    }
}

/// Resolve `spec` against a content length of `length` bytes.
///
/// - `bytes=B-E` serves `[B, min(E, L-1)]`; a missing `E` means `L-1`.
/// - `bytes=-N` serves the last `min(N, L)` bytes.
///
/// # Errors
///
/// [`RangeError::MultipleRanges`] when the specifier contains a comma,
/// [`RangeError::Malformed`] when it cannot be parsed, and
/// [`RangeError::Unsatisfiable`] when it selects no bytes.
///
/// # Examples
///
/// ```
/// use s3emu_core::range::resolve_range;
///
/// let range = resolve_range("bytes=2-5", 10).unwrap();
/// assert_eq!((range.start, range.end), (2, 5));
/// assert_eq!(range.content_range(), "bytes 2-5/10");
///
/// let tail = resolve_range("bytes=-3", 10).unwrap();
/// assert_eq!((tail.start, tail.end), (7, 9));
///
/// assert!(resolve_range("bytes=20-30", 10).is_err());
/// ```
pub fn resolve_range(spec: &str, length: u64) -> Result<ByteRange, RangeError> {
    let (unit, ranges) = spec
        .trim()
        .split_once('=')
        .ok_or_else(|| RangeError::Malformed(spec.to_owned()))?;
    if ranges.contains(',') {
        return Err(RangeError::MultipleRanges);
    }
    if unit.trim() != "bytes" {
        return Err(RangeError::Malformed(spec.to_owned()));
    }

    let (begin, end) = ranges
        .trim()
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed(spec.to_owned()))?;
    let parse = |s: &str| -> Result<Option<i64>, RangeError> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<u64>()
            .ok()
            .and_then(|n| i64::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| RangeError::Malformed(spec.to_owned()))
    };
    let begin = parse(begin.trim())?;
    let end = parse(end.trim())?;

    let len = i64::try_from(length).map_err(|_| RangeError::Unsatisfiable)?;
    let last = len - 1;
    let (begin, end) = match (begin, end) {
        (Some(b), Some(e)) => (b, e.min(last)),
        (Some(b), None) => (b, last),
        (None, Some(suffix)) => (len - suffix.min(len), last),
        (None, None) => return Err(RangeError::Malformed(spec.to_owned())),
    };

    if begin < 0 || end > last || begin > end {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(ByteRange {
        start: begin.unsigned_abs(),
        end: end.unsigned_abs(),
        total: length,
    })
}
