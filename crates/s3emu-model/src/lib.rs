//! Wire-level vocabulary for the s3emu in-memory object store.
//!
//! Everything here is plain data: the error codes that end up in `<Error>`
//! bodies, the operations the dispatcher routes to, the domain types shared
//! by the store and the XML layer, and the typed request/response documents.
#![allow(missing_docs)]

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use operations::S3Operation;
