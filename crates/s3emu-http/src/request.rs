//! The transport-independent request envelope.
//!
//! [`S3Request`] carries everything the dispatcher looks at: method, raw path,
//! decoded query pairs, headers and the fully collected body. Streamed uploads
//! that arrive over several calls mark each call with a [`StreamPhase`].

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;

/// Position of a request within a streamed object upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamPhase {
    /// The body is the whole object.
    #[default]
    Whole,
    /// First chunk; the object stays open for appends.
    Open,
    /// A continuation chunk appended to the open object.
    Append,
    /// Final chunk; the object is closed afterwards.
    Close,
}

/// An incoming request, already collected.
#[derive(Debug, Clone)]
pub struct S3Request {
    /// HTTP method.
    pub method: Method,
    /// Raw (percent-encoded) path, always starting with `/`.
    pub path: String,
    /// Decoded query pairs in request order. Flags such as `?acl` have an
    /// empty value.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
    /// Streamed-upload phase, only meaningful for object PUT.
    pub phase: StreamPhase,
}

impl S3Request {
    /// Create a request for `target`, a path with an optional query string.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            query: parse_query(query),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            phase: StreamPhase::Whole,
        }
    }

    /// Build a request from a collected `http` request.
    #[must_use]
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parse_query(parts.uri.query().unwrap_or_default()),
            headers: parts.headers,
            body,
            phase: StreamPhase::Whole,
        }
    }

    /// Add a header. Names or values that are not valid HTTP are dropped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the streamed-upload phase.
    #[must_use]
    pub fn with_phase(mut self, phase: StreamPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Whether the query string contains `name`, with or without a value.
    #[must_use]
    pub fn has_query(&self, name: &str) -> bool {
        self.query.iter().any(|(k, _)| k == name)
    }

    /// The first value of query parameter `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The first non-empty value of query parameter `name`.
    #[must_use]
    pub fn query_non_empty(&self, name: &str) -> Option<&str> {
        self.query_value(name).filter(|v| !v.is_empty())
    }

    /// A header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Host` header without its port.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.header(http::header::HOST.as_str())
            .map(|host| host.split(':').next().unwrap_or(host))
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
