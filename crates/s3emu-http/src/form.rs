//! Browser-form upload parsing.
//!
//! A form POST carries its fields either as `multipart/form-data` (the usual
//! browser upload) or as `application/x-www-form-urlencoded`. Both are
//! reduced to a [`FormUpload`]: ordered text fields plus the `file` payload.
//! Parsing works on the already-collected body bytes.

use bytes::Bytes;
use s3emu_core::S3ServiceError;

/// Why a form body could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The body is neither multipart nor urlencoded.
    #[error("POST requires multipart/form-data or urlencoded fields, got: {0}")]
    UnsupportedContentType(String),

    /// A multipart body without a usable `boundary` parameter.
    #[error("Missing boundary in Content-Type")]
    MissingBoundary,

    /// No `file` field was submitted.
    #[error("Missing file field in form data")]
    MissingFile,
}

impl From<FormError> for S3ServiceError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::MissingFile => Self::InvalidArgument {
                message: err.to_string(),
            },
            FormError::UnsupportedContentType(_) | FormError::MissingBoundary => {
                Self::InvalidRequest {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// A parsed form submission.
#[derive(Debug, Clone)]
pub struct FormUpload {
    /// Text fields in submission order, names as sent.
    pub fields: Vec<(String, String)>,
    /// The uploaded object data.
    pub file: Bytes,
    /// File name from the `file` part's `Content-Disposition`.
    pub filename: Option<String>,
    /// Content type of the `file` part.
    pub file_content_type: Option<String>,
}

impl FormUpload {
    /// Look up a field by name, ignoring ASCII case.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a form body according to its `Content-Type`.
///
/// # Errors
///
/// Returns [`FormError`] for an unsupported content type, a multipart body
/// without a boundary, or a submission with no `file` field.
pub fn parse_form(content_type: Option<&str>, body: &[u8]) -> Result<FormUpload, FormError> {
    let content_type = content_type.unwrap_or_default();
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "multipart/form-data" => {
            let boundary = extract_boundary(content_type).ok_or(FormError::MissingBoundary)?;
            parse_multipart(body, &boundary)
        }
        "application/x-www-form-urlencoded" | "" => parse_urlencoded(body),
        _ => Err(FormError::UnsupportedContentType(content_type.to_owned())),
    }
}

/// Pull the `boundary` parameter out of a multipart `Content-Type`.
fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

fn parse_urlencoded(body: &[u8]) -> Result<FormUpload, FormError> {
    let mut fields = Vec::new();
    let mut file = None;
    for (name, value) in form_urlencoded::parse(body) {
        if name == "file" {
            file = Some(Bytes::from(value.into_owned()));
        } else {
            fields.push((name.into_owned(), value.into_owned()));
        }
    }
    Ok(FormUpload {
        fields,
        file: file.ok_or(FormError::MissingFile)?,
        filename: None,
        file_content_type: None,
    })
}

fn parse_multipart(body: &[u8], boundary: &str) -> Result<FormUpload, FormError> {
    let delimiter = format!("--{boundary}");
    let mut fields = Vec::new();
    let mut file = None;

    for part in split_parts(body, delimiter.as_bytes()) {
        let Some((head, content)) = split_once_bytes(part, b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(head);
        let Some(disposition) = header_line(&head, "content-disposition") else {
            continue;
        };
        let Some(name) = disposition_param(disposition, "name") else {
            continue;
        };

        let filename = disposition_param(disposition, "filename");
        if name == "file" || filename.is_some() {
            file = Some((
                Bytes::copy_from_slice(content),
                filename,
                header_line(&head, "content-type").map(str::to_owned),
            ));
        } else {
            fields.push((name, String::from_utf8_lossy(content).into_owned()));
        }
    }

    let (file, filename, file_content_type) = file.ok_or(FormError::MissingFile)?;
    Ok(FormUpload {
        fields,
        file,
        filename,
        file_content_type,
    })
}

/// Split a multipart body into the parts between delimiters, dropping the
/// preamble, the epilogue and the CRLF framing around each part.
fn split_parts<'a>(body: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let Some((_, mut rest)) = split_once_bytes(body, delimiter) else {
        return parts;
    };

    // `--boundary--` closes the body.
    while !rest.starts_with(b"--") {
        rest = rest.strip_prefix(b"\r\n").unwrap_or(rest);
        match split_once_bytes(rest, delimiter) {
            Some((part, next)) => {
                parts.push(part.strip_suffix(b"\r\n").unwrap_or(part));
                rest = next;
            }
            None => {
                let part = rest.strip_suffix(b"\r\n").unwrap_or(rest);
                if !part.is_empty() {
                    parts.push(part);
                }
                break;
            }
        }
    }

    parts
}

fn split_once_bytes<'a>(data: &'a [u8], needle: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    if needle.is_empty() || data.len() < needle.len() {
        return None;
    }
    let pos = data.windows(needle.len()).position(|w| w == needle)?;
    Some((&data[..pos], &data[pos + needle.len()..]))
}

/// Value of header `name` in a part's header block.
fn header_line<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.split("\r\n").find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

/// A `Content-Disposition` parameter, quoted or bare.
fn disposition_param(disposition: &str, param: &str) -> Option<String> {
    disposition
        .split(';')
        .filter_map(|p| p.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(param))
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
}
