//! End-to-end scenarios for the s3emu object store.
//!
//! Every scenario runs in-process against a fresh [`S3Dispatcher`]; nothing
//! binds a socket. Set `RUST_LOG` to see the emulator's logs:
//!
//! ```text
//! RUST_LOG=s3emu_core=debug cargo test -p s3emu-integration
//! ```

use std::sync::Once;

use http::{Method, StatusCode};
use s3emu_core::{S3Config, S3Store};
use s3emu_http::{S3Dispatcher, S3Request, S3Response};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A dispatcher over an empty store with the default configuration.
#[must_use]
pub fn emulator() -> S3Dispatcher {
    emulator_with(S3Config::default())
}

/// A dispatcher over an empty store.
#[must_use]
pub fn emulator_with(config: S3Config) -> S3Dispatcher {
    init_tracing();
    S3Dispatcher::new(S3Store::new(config))
        .unwrap_or_else(|e| panic!("failed to build dispatcher: {e}"))
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Dispatch a request that is expected to be routed.
pub fn send(dispatcher: &S3Dispatcher, req: S3Request) -> S3Response {
    dispatcher
        .dispatch(&req)
        .unwrap_or_else(|e| panic!("{} {} was not routed: {e}", req.method, req.path))
}

/// The response body as text.
#[must_use]
pub fn body_text(resp: &S3Response) -> String {
    String::from_utf8_lossy(&resp.body).into_owned()
}

/// Text of the first `<tag>` element in an XML document, with `&quot;`
/// unescaped.
#[must_use]
pub fn xml_element(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let len = xml[start..].find(&close)?;
    Some(xml[start..start + len].replace("&quot;", "\""))
}

/// Create a bucket and return its name.
pub fn create_test_bucket(dispatcher: &S3Dispatcher, prefix: &str) -> String {
    let name = test_bucket_name(prefix);
    let resp = send(dispatcher, S3Request::new(Method::PUT, &format!("/{name}")));
    assert_eq!(
        resp.status,
        StatusCode::OK,
        "failed to create bucket {name}: {}",
        body_text(&resp)
    );
    name
}

/// Store an object and return the response.
pub fn put_object(dispatcher: &S3Dispatcher, bucket: &str, key: &str, data: &str) -> S3Response {
    send(
        dispatcher,
        S3Request::new(Method::PUT, &format!("/{bucket}/{key}")).with_body(data.to_owned()),
    )
}

/// Fetch an object's content, `None` on any non-200 status.
pub fn get_object(dispatcher: &S3Dispatcher, bucket: &str, key: &str) -> Option<String> {
    let resp = send(dispatcher, S3Request::new(Method::GET, &format!("/{bucket}/{key}")));
    (resp.status == StatusCode::OK).then(|| body_text(&resp))
}

/// Enable versioning on a bucket.
pub fn enable_versioning(dispatcher: &S3Dispatcher, bucket: &str) {
    let resp = send(
        dispatcher,
        S3Request::new(Method::PUT, &format!("/{bucket}?versioning"))
            .with_body("<VersioningConfiguration><Status>Enabled</Status></VersioningConfiguration>"),
    );
    assert_eq!(resp.status, StatusCode::OK, "{}", body_text(&resp));
}

mod test_acl;
mod test_bucket;
mod test_copy;
mod test_multipart;
mod test_object;
mod test_service;
mod test_versioning;
