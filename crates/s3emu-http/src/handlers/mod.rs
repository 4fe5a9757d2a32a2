//! Operation handlers, one submodule per operation family.
//!
//! Each handler is an inherent method on [`S3Dispatcher`] that reads what it
//! needs from the [`S3Request`], calls the store, and returns the family's
//! outcome type.

mod bucket;
mod multipart;
mod object;

use s3emu_core::{S3ServiceError, S3ServiceResult};
use s3emu_core::state::S3Object;
use s3emu_model::output::ObjectEntry;
use s3emu_model::types::Owner;
use s3emu_xml::{S3Deserialize, from_xml};
use tracing::debug;

use crate::dispatch::S3Dispatcher;
use crate::request::S3Request;

const COPY_SOURCE_HEADER: &str = "x-amz-copy-source";
const STORAGE_CLASS_HEADER: &str = "x-amz-storage-class";

impl S3Dispatcher {
    /// Owner of `bucket`.
    fn bucket_owner(&self, bucket: &str) -> S3ServiceResult<Owner> {
        Ok(self.store.get_bucket(bucket)?.owner.clone())
    }
}

/// Parse an XML request body, mapping any failure to `MalformedXML`.
fn parse_xml<T: S3Deserialize>(req: &S3Request) -> S3ServiceResult<T> {
    from_xml(&req.body).map_err(|err| {
        debug!(error = %err, "malformed XML body");
        S3ServiceError::MalformedXml
    })
}

/// A required, positive integer query parameter.
fn query_number(req: &S3Request, name: &str) -> S3ServiceResult<u32> {
    let value = req.query_value(name).unwrap_or_default();
    value.parse().map_err(|_| S3ServiceError::InvalidArgument {
        message: format!("{name} must be an integer, got '{value}'"),
    })
}

/// A required, non-empty query parameter.
fn query_required<'a>(req: &'a S3Request, name: &str) -> S3ServiceResult<&'a str> {
    req.query_non_empty(name)
        .ok_or_else(|| S3ServiceError::InvalidArgument {
            message: format!("missing required query parameter: {name}"),
        })
}

/// The storage class requested by headers, if any.
fn storage_class(req: &S3Request) -> &str {
    req.header(STORAGE_CLASS_HEADER)
        .unwrap_or(s3emu_model::types::DEFAULT_STORAGE_CLASS)
}

fn object_entry(object: &S3Object) -> ObjectEntry {
    ObjectEntry {
        key: object.key.clone(),
        last_modified: object.last_modified,
        etag: object.etag.clone(),
        size: object.size,
        storage_class: object.storage_class.clone(),
        owner: object.owner.clone(),
    }
}
