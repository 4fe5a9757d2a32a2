//! hyper `Service` adapter over [`S3Dispatcher`].
//!
//! [`S3HttpService`] is the outer edge of the emulator:
//!
//! 1. Collects the request body
//! 2. Hands the request to the dispatcher
//! 3. Renders requests the dispatcher could not route as `501 NotImplemented`
//! 4. Adds the `Server` header
//!
//! Binding a listener and driving connections is left to the embedding
//! application.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Full};
use hyper::service::Service;
use s3emu_core::utils::generate_request_id;
use s3emu_model::error::S3Error;
use tracing::{debug, error, warn};

use crate::dispatch::S3Dispatcher;
use crate::request::S3Request;
use crate::response::{REQUEST_ID_HEADER, S3Response, error_to_response};

const SERVER_NAME: &str = "s3emu";

/// The S3 HTTP service implementing hyper's `Service` trait.
#[derive(Debug, Clone)]
pub struct S3HttpService {
    dispatcher: Arc<S3Dispatcher>,
}

impl S3HttpService {
    /// Create a service over `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: S3Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Create a service from a shared dispatcher.
    #[must_use]
    pub fn from_shared(dispatcher: Arc<S3Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// The dispatcher behind this service.
    #[must_use]
    pub fn dispatcher(&self) -> &S3Dispatcher {
        &self.dispatcher
    }
}

impl<B> Service<http::Request<B>> for S3HttpService
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Display,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let dispatcher = Arc::clone(&self.dispatcher);
        Box::pin(async move {
            let mut resp = process_request(&dispatcher, req).await;
            resp.set_header("server", SERVER_NAME);
            Ok(resp.into_http())
        })
    }
}

async fn process_request<B>(dispatcher: &S3Dispatcher, req: http::Request<B>) -> S3Response
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();
    let with_body = parts.method != http::Method::HEAD;
    debug!(method = %parts.method, uri = %parts.uri, "processing S3 request");

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            error!(error = %err, "failed to collect request body");
            let request_id = generate_request_id();
            let err = S3Error::internal_error("Failed to read request body");
            return error_to_response(&err, &request_id, with_body)
                .with_header(REQUEST_ID_HEADER, &request_id);
        }
    };

    let request = S3Request::from_parts(parts, body);
    match dispatcher.dispatch(&request) {
        Ok(resp) => resp,
        Err(err) => {
            warn!(method = %request.method, path = %request.path, error = %err, "unsupported S3 request");
            let request_id = err.request_id.clone().unwrap_or_else(generate_request_id);
            error_to_response(&err, &request_id, with_body)
                .with_header(REQUEST_ID_HEADER, &request_id)
        }
    }
}
