//! Multipart upload handlers.

use s3emu_core::S3ServiceResult;
use s3emu_core::utils::{metadata_from_headers, parse_copy_source};
use s3emu_model::input::CompletedMultipartUpload;
use s3emu_model::output::{
    CompleteMultipartUploadResult, InitiateMultipartUploadResult, ListPartsResult, PartEntry,
};

use super::{COPY_SOURCE_HEADER, parse_xml, query_number, query_required, storage_class};
use crate::codec::decode_payload;
use crate::dispatch::S3Dispatcher;
use crate::outcome::MultipartOutcome;
use crate::request::S3Request;

const COPY_SOURCE_RANGE_HEADER: &str = "x-amz-copy-source-range";
const MAX_PARTS: usize = 1000;

impl S3Dispatcher {
    pub(crate) fn create_multipart(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<MultipartOutcome> {
        let upload = self.store.initiate_multipart(
            bucket,
            key,
            metadata_from_headers(&req.headers),
            storage_class(req),
        )?;
        Ok(MultipartOutcome::Initiated(InitiateMultipartUploadResult {
            bucket: bucket.to_owned(),
            key: upload.key,
            upload_id: upload.upload_id,
        }))
    }

    pub(crate) fn upload_part(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<MultipartOutcome> {
        let upload_id = query_required(req, "uploadId")?;
        let part_number = query_number(req, "partNumber")?;
        let mut headers = req.headers.clone();
        let data = decode_payload(&mut headers, &req.body)?;

        let part = self.store.set_part(bucket, upload_id, part_number, data)?;
        Ok(MultipartOutcome::PartStored(part))
    }

    pub(crate) fn upload_part_copy(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<MultipartOutcome> {
        let upload_id = query_required(req, "uploadId")?;
        let part_number = query_number(req, "partNumber")?;
        let source = parse_copy_source(req.header(COPY_SOURCE_HEADER).unwrap_or_default())?;

        let part = self.store.copy_part(
            bucket,
            upload_id,
            part_number,
            &source,
            req.header(COPY_SOURCE_RANGE_HEADER),
        )?;
        Ok(MultipartOutcome::PartCopied(part))
    }

    /// `GET ?uploadId`. Parts are listed in part-number order, never
    /// truncated.
    pub(crate) fn list_parts(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<MultipartOutcome> {
        let upload_id = query_required(req, "uploadId")?;
        let upload = self.store.list_parts(bucket, upload_id)?;

        let parts: Vec<PartEntry> = upload
            .parts
            .values()
            .map(|part| PartEntry {
                part_number: part.part_number,
                last_modified: part.last_modified,
                etag: part.etag.clone(),
                size: part.size,
            })
            .collect();
        let next_part_number_marker = parts.last().map_or(0, |p| p.part_number);

        Ok(MultipartOutcome::Parts(ListPartsResult {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            upload_id: upload.upload_id,
            storage_class: upload.storage_class,
            initiator: upload.owner.clone(),
            owner: upload.owner,
            part_number_marker: 0,
            next_part_number_marker,
            max_parts: MAX_PARTS,
            is_truncated: false,
            parts,
        }))
    }

    /// `POST ?uploadId`. The upload stays pending when completion fails.
    pub(crate) fn complete_multipart(&self, bucket: &str, key: &str, req: &S3Request) -> S3ServiceResult<MultipartOutcome> {
        let upload_id = query_required(req, "uploadId")?;
        let completion: CompletedMultipartUpload = parse_xml(req)?;

        let object = self.store.complete_multipart(bucket, upload_id, &completion.parts)?;

        Ok(MultipartOutcome::Completed {
            result: CompleteMultipartUploadResult {
                location: format!("/{bucket}/{key}"),
                bucket: bucket.to_owned(),
                key: object.key,
                etag: object.etag,
            },
            version_id: object.version_id,
        })
    }

    pub(crate) fn abort_multipart(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<MultipartOutcome> {
        let upload_id = query_required(req, "uploadId")?;
        self.store.cancel_multipart(bucket, upload_id)?;
        Ok(MultipartOutcome::Aborted)
    }
}
