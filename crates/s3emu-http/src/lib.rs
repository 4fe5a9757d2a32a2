//! S3 request dispatching, response shaping and hyper service.
//!
//! This crate is the protocol half of the s3emu emulator:
//!
//! - **Request** ([`request`]): The collected [`S3Request`], including the
//!   streamed-upload phase of object PUTs.
//!
//! - **Routing** ([`router`]): Maps a request to an [`S3Operation`] from its
//!   method, path and sub-resource markers. Supports path-style and
//!   virtual-hosted-style addressing and reads the region from the host name.
//!
//! - **Dispatch** ([`dispatch`]): [`S3Dispatcher`] calls the store for each
//!   operation and renders the outcome, applying byte ranges to object reads.
//!
//! - **Response** ([`response`]): [`S3Response`] plus the shared header and
//!   `<Error>` rendering helpers.
//!
//! - **Codecs** ([`codec`], [`form`]): aws-chunked payload decoding and
//!   browser-form upload parsing.
//!
//! - **Service** ([`service`]): [`S3HttpService`], a hyper `Service` over the
//!   dispatcher.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> S3HttpService (hyper Service, body collection)
//!     -> S3Dispatcher
//!       -> S3Router (addressing + operation identification)
//!       -> handler (S3Store call) -> Outcome
//!       -> Outcome rendering / <Error> rendering
//!       -> Range narrowing, x-amz-request-id
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use s3emu_core::{S3Config, S3Store};
//! use s3emu_http::{S3Dispatcher, S3Request};
//!
//! let dispatcher = S3Dispatcher::new(S3Store::new(S3Config::default())).unwrap();
//! let resp = dispatcher.dispatch(&S3Request::new(Method::PUT, "/photos")).unwrap();
//! assert_eq!(resp.status, StatusCode::OK);
//! ```
//!
//! [`S3Operation`]: s3emu_model::S3Operation

// S3Error is the wire error carried by every unrouted request; boxing it in
// each Result buys nothing on this path.
#![allow(clippy::result_large_err)]

pub mod codec;
pub mod dispatch;
pub mod form;
mod handlers;
pub mod outcome;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use dispatch::S3Dispatcher;
pub use request::{S3Request, StreamPhase};
pub use response::S3Response;
pub use router::{RoutingContext, S3Router};
pub use service::S3HttpService;
