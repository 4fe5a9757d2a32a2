//! Multipart upload engine.
//!
//! An upload lives in its bucket's `multipart_uploads` map from initiate
//! until it is completed or cancelled. A failed completion leaves it in
//! place so the client can retry with a corrected part list.

use bytes::Bytes;
use s3emu_model::input::CompletedPart;
use tracing::{debug, info};

use crate::error::{S3ServiceError, S3ServiceResult};
use crate::ops::object::commit_object;
use crate::range::resolve_range;
use crate::state::{MultipartUpload, ObjectMetadata, S3Object, UploadPart};
use crate::store::S3Store;
use crate::utils::{CopySource, generate_upload_id, normalize_etag};

impl S3Store {
    /// Start a multipart upload for `key`.
    pub fn initiate_multipart(
        &self,
        bucket: &str,
        key: &str,
        metadata: ObjectMetadata,
        storage_class: &str,
    ) -> S3ServiceResult<MultipartUpload> {
        let b = self.get_bucket(bucket)?;
        let mut upload =
            MultipartUpload::new(generate_upload_id(), key.to_owned(), b.owner.clone(), metadata);
        upload.storage_class = storage_class.to_owned();

        debug!(bucket, key, upload_id = %upload.upload_id, "multipart upload initiated");
        b.multipart_uploads
            .insert(upload.upload_id.clone(), upload.clone());
        Ok(upload)
    }

    /// Store or overwrite one part.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for part number 0, `NoSuchUpload` if the upload is
    /// unknown.
    pub fn set_part(
        &self,
        bucket: &str,
        upload_id: &str,
        part_number: u32,
        data: Bytes,
    ) -> S3ServiceResult<UploadPart> {
        if part_number == 0 {
            return Err(S3ServiceError::InvalidArgument {
                message: "Part number must be a positive integer".to_owned(),
            });
        }
        let part = UploadPart::new(part_number, data);

        let b = self.get_bucket(bucket)?;
        let mut upload = b
            .multipart_uploads
            .get_mut(upload_id)
            .ok_or_else(|| no_such_upload(upload_id))?;
        upload.put_part(part.clone());
        debug!(bucket, upload_id, part_number, size = part.size, "part stored");
        Ok(part)
    }

    /// Store a part whose content comes from an existing object, optionally
    /// restricted to a byte range (`bytes=first-last`).
    ///
    /// # Errors
    ///
    /// `NoSuchKey` / `NoSuchVersion` for a missing source, `InvalidRange` /
    /// `InvalidRequest` for a bad range, plus the errors of [`Self::set_part`].
    pub fn copy_part(
        &self,
        bucket: &str,
        upload_id: &str,
        part_number: u32,
        source: &CopySource,
        range: Option<&str>,
    ) -> S3ServiceResult<UploadPart> {
        let src = self.read_source(source)?;
        let content = match range {
            Some(spec) => resolve_range(spec, src.size)?.slice(&src.content),
            None => src.content,
        };
        self.set_part(bucket, upload_id, part_number, content)
    }

    /// Assemble the listed parts into an object and end the upload.
    ///
    /// `parts` must be strictly increasing by part number and every entry
    /// must name a stored part with a matching ETag (quotes are ignored).
    ///
    /// # Errors
    ///
    /// `MalformedXml` for an empty list, `InvalidPartOrder` for an unsorted or
    /// duplicated list, `InvalidPart` for a missing or mismatched part,
    /// `NoSuchUpload` if the upload is unknown. The upload stays pending on
    /// every error.
    pub fn complete_multipart(
        &self,
        bucket: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> S3ServiceResult<S3Object> {
        if parts.is_empty() {
            return Err(S3ServiceError::MalformedXml);
        }
        if parts
            .windows(2)
            .any(|pair| pair[0].part_number >= pair[1].part_number)
        {
            return Err(S3ServiceError::InvalidPartOrder);
        }

        let b = self.get_bucket(bucket)?;
        let content = {
            let upload = b
                .multipart_uploads
                .get(upload_id)
                .ok_or_else(|| no_such_upload(upload_id))?;
            let mut buf = Vec::with_capacity(usize::try_from(upload.total_size()).unwrap_or(0));
            for requested in parts {
                let stored = upload
                    .get_part(requested.part_number)
                    .filter(|p| normalize_etag(&p.etag) == normalize_etag(&requested.etag))
                    .ok_or(S3ServiceError::InvalidPart {
                        part_number: requested.part_number,
                    })?;
                buf.extend_from_slice(&stored.content);
            }
            Bytes::from(buf)
        };

        let (_, upload) = b
            .multipart_uploads
            .remove(upload_id)
            .ok_or_else(|| no_such_upload(upload_id))?;

        let mut object = S3Object::new(upload.key, content);
        object.metadata = upload.metadata;
        object.storage_class = upload.storage_class;
        object.owner = upload.owner;
        let stored = commit_object(&b, object);

        info!(
            bucket,
            key = %stored.key,
            upload_id,
            parts = parts.len(),
            size = stored.size,
            "multipart upload completed"
        );
        Ok(stored)
    }

    /// Abort an upload and discard its parts.
    ///
    /// # Errors
    ///
    /// `NoSuchUpload` if the upload is unknown.
    pub fn cancel_multipart(&self, bucket: &str, upload_id: &str) -> S3ServiceResult<()> {
        let b = self.get_bucket(bucket)?;
        b.multipart_uploads
            .remove(upload_id)
            .map(|_| debug!(bucket, upload_id, "multipart upload aborted"))
            .ok_or_else(|| no_such_upload(upload_id))
    }

    /// Snapshot of an upload; its parts are ordered by part number.
    ///
    /// # Errors
    ///
    /// `NoSuchUpload` if the upload is unknown.
    pub fn list_parts(&self, bucket: &str, upload_id: &str) -> S3ServiceResult<MultipartUpload> {
        let b = self.get_bucket(bucket)?;
        b.multipart_uploads
            .get(upload_id)
            .map(|upload| upload.clone())
            .ok_or_else(|| no_such_upload(upload_id))
    }

    /// Pending uploads of a bucket, optionally filtered by key prefix and
    /// ordered by key then initiation time.
    pub fn list_multipart_uploads(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> S3ServiceResult<Vec<MultipartUpload>> {
        let b = self.get_bucket(bucket)?;
        let prefix = prefix.unwrap_or_default();
        let mut uploads: Vec<MultipartUpload> = b
            .multipart_uploads
            .iter()
            .filter(|entry| entry.key.starts_with(prefix))
            .map(|entry| entry.value().clone())
            .collect();
        uploads.sort_by(|a, b| a.key.cmp(&b.key).then(a.initiated.cmp(&b.initiated)));
        Ok(uploads)
    }
}

fn no_such_upload(upload_id: &str) -> S3ServiceError {
    S3ServiceError::NoSuchUpload {
        upload_id: upload_id.to_owned(),
    }
}
