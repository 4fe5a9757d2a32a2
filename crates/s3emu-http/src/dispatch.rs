//! The request dispatcher.
//!
//! [`S3Dispatcher`] bridges the routing layer and the store:
//!
//! 1. Resolves the request to an operation via [`S3Router`]
//! 2. Calls the matching handler, which returns a tagged [`Outcome`]
//! 3. Renders the outcome (or a recoverable failure) into an [`S3Response`]
//! 4. Applies the `Range` header to successful object reads
//!
//! Recoverable failures never escape: they become `<Error>` responses. Only a
//! request the routing table cannot place is returned as `Err`.

use http::{Method, StatusCode};
use s3emu_core::range::resolve_range;
use s3emu_core::utils::generate_request_id;
use s3emu_core::{S3ServiceError, S3ServiceResult, S3Store};
use s3emu_model::S3Operation;
use s3emu_model::error::S3Error;
use tracing::{debug, error, warn};

use crate::outcome::{IntoS3Response, Outcome};
use crate::request::S3Request;
use crate::response::{REQUEST_ID_HEADER, S3Response, error_to_response};
use crate::router::{RoutingContext, S3Router};

/// Routes requests to store operations and shapes their responses.
#[derive(Debug, Clone)]
pub struct S3Dispatcher {
    pub(crate) store: S3Store,
    pub(crate) router: S3Router,
}

impl S3Dispatcher {
    /// Create a dispatcher over `store`, configured from the store's config.
    ///
    /// # Errors
    ///
    /// Returns the compile error if the configured host pattern is not a
    /// valid regular expression.
    pub fn new(store: S3Store) -> Result<Self, regex::Error> {
        let router = S3Router::from_config(store.config())?;
        Ok(Self { store, router })
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S3Store {
        &self.store
    }

    /// The router.
    #[must_use]
    pub fn router(&self) -> &S3Router {
        &self.router
    }

    /// Dispatch one request.
    ///
    /// Every response carries an `x-amz-request-id` header. HEAD error
    /// responses carry no body.
    ///
    /// # Errors
    ///
    /// Returns a `NotImplemented` [`S3Error`] when the method, scope and
    /// marker combination is not routed.
    pub fn dispatch(&self, req: &S3Request) -> Result<S3Response, S3Error> {
        let request_id = generate_request_id();
        let with_body = req.method != Method::HEAD;

        let ctx = self.router.resolve(req).map_err(|err| {
            warn!(method = %req.method, path = %req.path, error = %err, "request not routed");
            err.with_request_id(request_id.clone())
        })?;

        let mut resp = match self.handle(&ctx, req) {
            Ok(outcome) => outcome.into_s3_response().unwrap_or_else(|err| {
                error!(operation = %ctx.operation, error = %err, "failed to render response");
                error_to_response(&S3Error::internal_error(err.to_string()), &request_id, with_body)
            }),
            Err(err) if err.category().is_recoverable() => {
                debug!(operation = %ctx.operation, error = %err, "operation failed");
                error_to_response(&err.into_s3_error(), &request_id, with_body)
            }
            Err(err) => return Err(err.into_s3_error().with_request_id(request_id)),
        };

        if ctx.operation == S3Operation::GetObject {
            resp = apply_range(req, resp, &request_id);
        }
        resp.set_header(REQUEST_ID_HEADER, &request_id);
        Ok(resp)
    }

    fn handle(&self, ctx: &RoutingContext, req: &S3Request) -> S3ServiceResult<Outcome> {
        let bucket = ctx.bucket();
        let key = ctx.key();

        match ctx.operation {
            // Service / bucket reads
            S3Operation::ListBuckets => Ok(self.list_buckets().into()),
            S3Operation::HeadBucket => self.head_bucket(bucket).map(Into::into),
            S3Operation::ListMultipartUploads => self.list_uploads(bucket, req).map(Into::into),
            S3Operation::GetBucketLocation => self.get_location(bucket).map(Into::into),
            S3Operation::GetBucketLifecycle => self.get_lifecycle(bucket).map(Into::into),
            S3Operation::GetBucketVersioning => self.get_versioning(bucket).map(Into::into),
            S3Operation::GetBucketPolicy => self.get_policy(bucket).map(Into::into),
            S3Operation::GetBucketWebsite => self.get_website(bucket).map(Into::into),
            S3Operation::GetBucketAcl => self.get_bucket_acl(bucket).map(Into::into),
            S3Operation::ListObjectVersions => self.list_versions(bucket, req).map(Into::into),
            S3Operation::ListObjects => self.list_objects(bucket, req).map(Into::into),

            // Bucket writes
            S3Operation::PutBucketVersioning => self.put_versioning(bucket, req).map(Into::into),
            S3Operation::PutBucketLifecycle => self.put_lifecycle(bucket, req).map(Into::into),
            S3Operation::PutBucketPolicy => self.put_policy(bucket, req).map(Into::into),
            S3Operation::PutBucketAcl => self.put_bucket_acl(bucket, req).map(Into::into),
            S3Operation::PutBucketWebsite => self.put_website(bucket, req).map(Into::into),
            S3Operation::CreateBucket => self.create_bucket(ctx, req).map(Into::into),
            S3Operation::DeleteBucketPolicy => self.delete_policy(bucket).map(Into::into),
            S3Operation::DeleteBucketLifecycle => self.delete_lifecycle(bucket).map(Into::into),
            S3Operation::DeleteBucket => self.delete_bucket(bucket).map(Into::into),
            S3Operation::DeleteObjects => self.delete_objects(bucket, req).map(Into::into),
            S3Operation::PostObject => self.post_object(bucket, req).map(Into::into),

            // Objects
            S3Operation::GetObjectAcl => self.get_object_acl(bucket, key, req).map(Into::into),
            S3Operation::GetObject => self.get_object(bucket, key, req).map(Into::into),
            S3Operation::HeadObject => self.head_object(bucket, key, req).map(Into::into),
            S3Operation::PutObjectAcl => self.put_object_acl(bucket, key, req).map(Into::into),
            S3Operation::CopyObject => self.copy_object(bucket, key, req).map(Into::into),
            S3Operation::PutObject => self.put_object(bucket, key, req).map(Into::into),
            S3Operation::DeleteObject => self.delete_object(bucket, key, req).map(Into::into),
            S3Operation::RestoreObject => self.restore_object(bucket, key, req).map(Into::into),

            // Multipart
            S3Operation::CreateMultipartUpload => {
                self.create_multipart(bucket, key, req).map(Into::into)
            }
            S3Operation::UploadPart => self.upload_part(bucket, req).map(Into::into),
            S3Operation::UploadPartCopy => self.upload_part_copy(bucket, req).map(Into::into),
            S3Operation::ListParts => self.list_parts(bucket, key, req).map(Into::into),
            S3Operation::CompleteMultipartUpload => {
                self.complete_multipart(bucket, key, req).map(Into::into)
            }
            S3Operation::AbortMultipartUpload => self.abort_multipart(bucket, req).map(Into::into),
        }
    }
}

/// Narrow a successful object read to the requested byte range.
///
/// A malformed or multi-range header yields 400, an unsatisfiable one 416.
fn apply_range(req: &S3Request, mut resp: S3Response, request_id: &str) -> S3Response {
    if resp.status != StatusCode::OK {
        return resp;
    }
    let Some(spec) = req.header(http::header::RANGE.as_str()) else {
        return resp;
    };

    match resolve_range(spec, resp.body.len() as u64) {
        Ok(range) => {
            resp.body = range.slice(&resp.body);
            resp.status = StatusCode::PARTIAL_CONTENT;
            resp.set_header("content-range", &range.content_range());
            resp.set_header("content-length", &range.len().to_string());
            resp
        }
        Err(err) => {
            debug!(range = spec, error = %err, "range rejected");
            error_to_response(&S3ServiceError::from(err).into_s3_error(), request_id, true)
        }
    }
}
