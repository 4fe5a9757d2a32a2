//! Key-scoped object handlers.

use s3emu_core::acl::acl_from_headers;
use s3emu_core::ops::object::{CopyOptions, WriteOptions};
use s3emu_core::state::S3Object;
use s3emu_core::utils::{metadata_from_headers, parse_copy_source};
use s3emu_core::{S3ServiceError, S3ServiceResult};
use s3emu_model::input::RestoreRequest;
use s3emu_model::output::AccessControlPolicy;
use tracing::debug;

use super::{COPY_SOURCE_HEADER, parse_xml, storage_class};
use crate::codec::decode_payload;
use crate::dispatch::S3Dispatcher;
use crate::outcome::KeyOutcome;
use crate::request::{S3Request, StreamPhase};

const METADATA_DIRECTIVE_HEADER: &str = "x-amz-metadata-directive";

impl S3Dispatcher {
    pub(crate) fn get_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        self.read_object(bucket, key, req).map(KeyOutcome::Object)
    }

    pub(crate) fn head_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        self.read_object(bucket, key, req).map(KeyOutcome::Head)
    }

    /// The current object, or the version named by `?versionId`.
    fn read_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<S3Object> {
        let version_id = req.query_non_empty("versionId");
        self.store
            .get_key(bucket, key, version_id)?
            .ok_or_else(|| match version_id {
                Some(version_id) => S3ServiceError::NoSuchVersion {
                    key: key.to_owned(),
                    version_id: version_id.to_owned(),
                },
                None => S3ServiceError::NoSuchKey { key: key.to_owned() },
            })
    }

    pub(crate) fn get_object_acl(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        let owner = self.bucket_owner(bucket)?;
        let acl = self
            .store
            .get_key_acl(bucket, key, req.query_non_empty("versionId"))?;
        Ok(KeyOutcome::Acl(AccessControlPolicy { owner, acl }))
    }

    /// `PUT ?acl`. Without ACL headers the object must still exist.
    pub(crate) fn put_object_acl(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        let owner = self.bucket_owner(bucket)?;
        match acl_from_headers(&req.headers, &owner)? {
            Some(acl) => self.store.set_key_acl(bucket, key, acl)?,
            None => {
                self.store.get_key_acl(bucket, key, None)?;
            }
        }
        Ok(KeyOutcome::AclUpdated)
    }

    /// `PUT` with `x-amz-copy-source`.
    ///
    /// Metadata is copied from the source unless the metadata directive is
    /// `REPLACE`.
    pub(crate) fn copy_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        let source = parse_copy_source(req.header(COPY_SOURCE_HEADER).unwrap_or_default())?;
        let owner = self.bucket_owner(bucket)?;

        let replace = req
            .header(METADATA_DIRECTIVE_HEADER)
            .is_some_and(|d| d.eq_ignore_ascii_case("REPLACE"));
        let options = CopyOptions {
            storage_class: storage_class(req).to_owned(),
            acl: acl_from_headers(&req.headers, &owner)?,
            metadata: replace.then(|| metadata_from_headers(&req.headers)),
        };

        let object = self.store.copy_key(&source, bucket, key, options)?;
        Ok(KeyOutcome::Copied(object))
    }

    /// `PUT /bucket/key`, including the chunks of a streamed upload.
    pub(crate) fn put_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        let mut headers = req.headers.clone();
        let data = decode_payload(&mut headers, &req.body)?;

        let object = match req.phase {
            StreamPhase::Whole => self.store.put_object(bucket, key, data, self.write_options(bucket, req, &headers)?)?,
            StreamPhase::Open => self.store.open_append(bucket, key, data, self.write_options(bucket, req, &headers)?)?,
            StreamPhase::Append => self.store.append_to_key(bucket, key, &data)?,
            StreamPhase::Close => {
                if !data.is_empty() {
                    self.store.append_to_key(bucket, key, &data)?;
                }
                self.store.close_append(bucket, key)?
            }
        };
        Ok(KeyOutcome::Stored(object))
    }

    fn write_options(
        &self,
        bucket: &str,
        req: &S3Request,
        headers: &http::HeaderMap,
    ) -> S3ServiceResult<WriteOptions> {
        let owner = self.bucket_owner(bucket)?;
        Ok(WriteOptions {
            storage_class: storage_class(req).to_owned(),
            metadata: metadata_from_headers(headers),
            acl: acl_from_headers(headers, &owner)?,
        })
    }

    pub(crate) fn delete_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        if let Some(version_id) = req.query_non_empty("versionId") {
            self.store.delete_key_version(bucket, key, version_id)?;
            return Ok(KeyOutcome::VersionDeleted {
                version_id: version_id.to_owned(),
            });
        }

        let delete_marker = self.store.delete_key(bucket, key)?;
        if let Some(marker) = &delete_marker {
            debug!(bucket, key, marker = %marker, "delete marker inserted");
        }
        Ok(KeyOutcome::Deleted { delete_marker })
    }

    /// `POST ?restore`. Answers 202 for a first restore and 200 after that.
    pub(crate) fn restore_object(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<KeyOutcome> {
        let request: RestoreRequest = parse_xml(req)?;
        let already = self.store.restore_key(bucket, key, request.days)?;
        Ok(KeyOutcome::Restored { already })
    }
}
