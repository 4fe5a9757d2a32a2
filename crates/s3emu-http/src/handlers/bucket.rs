//! Service- and bucket-scoped handlers.

use http::StatusCode;
use s3emu_core::acl::{acl_from_headers, canned_acl};
use s3emu_core::ops::object::{ListedVersion, WriteOptions};
use s3emu_core::utils::metadata_from_pairs;
use s3emu_core::{S3ServiceError, S3ServiceResult};
use s3emu_model::input::{CreateBucketConfiguration, Delete, LifecycleConfiguration, VersioningConfiguration};
use s3emu_model::output::{
    AccessControlPolicy, BucketEntry, DeleteError, DeleteResult, ListAllMyBucketsResult,
    ListBucketResult, ListMultipartUploadsResult, ListVersionsResult, PostResponse, UploadEntry,
    VersionEntry,
};
use s3emu_model::types::{CannedAcl, DEFAULT_STORAGE_CLASS, Owner, VersioningStatus};
use tracing::{debug, info};

use super::{object_entry, parse_xml};
use crate::dispatch::S3Dispatcher;
use crate::form::parse_form;
use crate::outcome::BucketOutcome;
use crate::request::S3Request;
use crate::router::RoutingContext;

const FILENAME_PLACEHOLDER: &str = "${filename}";

impl S3Dispatcher {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub(crate) fn list_buckets(&self) -> BucketOutcome {
        let buckets = self
            .store
            .list_buckets()
            .into_iter()
            .map(|(name, creation_date)| BucketEntry {
                name,
                creation_date,
            })
            .collect();
        BucketOutcome::Buckets(ListAllMyBucketsResult {
            owner: Owner::default(),
            buckets,
        })
    }

    pub(crate) fn head_bucket(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.get_bucket(bucket).map(|_| BucketOutcome::Exists)
    }

    /// `GET ?uploads`. Only `prefix` filtering is supported.
    pub(crate) fn list_uploads(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        for unsupported in ["delimiter", "max-uploads"] {
            if req.has_query(unsupported) {
                return Err(S3ServiceError::InvalidArgument {
                    message: format!("{unsupported} is not supported when listing multipart uploads"),
                });
            }
        }

        let prefix = req.query_value("prefix");
        let uploads = self
            .store
            .list_multipart_uploads(bucket, prefix)?
            .into_iter()
            .map(|upload| UploadEntry {
                key: upload.key,
                upload_id: upload.upload_id,
                initiator: upload.owner.clone(),
                owner: upload.owner,
                storage_class: upload.storage_class,
                initiated: upload.initiated,
            })
            .collect();

        Ok(BucketOutcome::Uploads(ListMultipartUploadsResult {
            bucket: bucket.to_owned(),
            prefix: prefix.map(str::to_owned),
            max_uploads: self.store.config().max_keys,
            uploads,
            ..ListMultipartUploadsResult::default()
        }))
    }

    pub(crate) fn get_location(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.bucket_location(bucket).map(BucketOutcome::Location)
    }

    pub(crate) fn get_lifecycle(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        let rules = self.store.get_lifecycle(bucket)?;
        Ok(BucketOutcome::Lifecycle(LifecycleConfiguration { rules }))
    }

    pub(crate) fn get_versioning(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.get_versioning(bucket).map(BucketOutcome::Versioning)
    }

    pub(crate) fn get_policy(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.get_policy(bucket).map(BucketOutcome::Policy)
    }

    pub(crate) fn get_website(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.get_website(bucket).map(BucketOutcome::Website)
    }

    pub(crate) fn get_bucket_acl(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        let owner = self.bucket_owner(bucket)?;
        let acl = self.store.get_bucket_acl(bucket)?;
        Ok(BucketOutcome::Acl(AccessControlPolicy { owner, acl }))
    }

    /// `GET ?versions`. Marker and `max-keys` parameters are echoed but the
    /// full listing is always returned.
    pub(crate) fn list_versions(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let prefix = req.query_value("prefix").unwrap_or_default();
        let delimiter = req.query_non_empty("delimiter");
        let listing = self.store.list_versions(bucket, prefix, delimiter)?;

        let entries = listing
            .keys
            .into_iter()
            .map(|entry| match entry {
                ListedVersion::Object { object, is_latest } => VersionEntry::Version {
                    object: object_entry(&object),
                    version_id: object.version_id,
                    is_latest,
                },
                ListedVersion::DeleteMarker { marker, is_latest } => VersionEntry::DeleteMarker {
                    key: marker.key,
                    version_id: marker.version_id,
                    is_latest,
                    last_modified: marker.last_modified,
                    owner: marker.owner,
                },
            })
            .collect();

        Ok(BucketOutcome::Versions(ListVersionsResult {
            name: bucket.to_owned(),
            prefix: prefix.to_owned(),
            key_marker: req.query_value("key-marker").unwrap_or_default().to_owned(),
            version_id_marker: req
                .query_value("version-id-marker")
                .unwrap_or_default()
                .to_owned(),
            delimiter: delimiter.map(str::to_owned),
            max_keys: self.store.config().max_keys,
            is_truncated: false,
            entries,
            common_prefixes: listing.common_prefixes,
        }))
    }

    pub(crate) fn list_objects(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let prefix = req.query_value("prefix").unwrap_or_default();
        let delimiter = req.query_non_empty("delimiter");
        let listing = self.store.prefix_query(bucket, prefix, delimiter)?;

        Ok(BucketOutcome::Objects(ListBucketResult {
            name: bucket.to_owned(),
            prefix: prefix.to_owned(),
            delimiter: delimiter.map(str::to_owned),
            max_keys: self.store.config().max_keys,
            is_truncated: false,
            contents: listing.keys.iter().map(object_entry).collect(),
            common_prefixes: listing.common_prefixes,
        }))
    }

    // -----------------------------------------------------------------------
    // Sub-resource writes
    // -----------------------------------------------------------------------

    /// `PUT ?versioning`. The new status is echoed back.
    pub(crate) fn put_versioning(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let config: VersioningConfiguration = parse_xml(req)?;
        let status = config
            .status
            .as_deref()
            .and_then(VersioningStatus::from_status)
            .ok_or(S3ServiceError::MalformedXml)?;
        self.store.set_versioning(bucket, status)?;
        debug!(bucket, status = ?status, "versioning changed");
        Ok(BucketOutcome::Versioning(status))
    }

    pub(crate) fn put_lifecycle(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let config: LifecycleConfiguration = parse_xml(req)?;
        self.store.set_lifecycle(bucket, config.rules)?;
        Ok(BucketOutcome::Updated)
    }

    pub(crate) fn put_policy(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        self.store.set_policy(bucket, req.body.clone())?;
        Ok(BucketOutcome::PolicySet)
    }

    /// `PUT ?acl`. Without ACL headers the current ACL is kept.
    pub(crate) fn put_bucket_acl(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let owner = self.bucket_owner(bucket)?;
        if let Some(acl) = acl_from_headers(&req.headers, &owner)? {
            self.store.set_bucket_acl(bucket, acl)?;
        }
        Ok(BucketOutcome::Updated)
    }

    pub(crate) fn put_website(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        self.store.set_website(bucket, req.body.clone())?;
        Ok(BucketOutcome::Updated)
    }

    // -----------------------------------------------------------------------
    // Bucket lifecycle
    // -----------------------------------------------------------------------

    /// `PUT /bucket`.
    ///
    /// The region comes from the body's `<LocationConstraint>`, then the
    /// host name, then the configured default. Re-creating a bucket in the
    /// default region returns the existing bucket.
    pub(crate) fn create_bucket(&self, ctx: &RoutingContext, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let bucket = ctx.bucket();
        let constraint = if req.body.is_empty() {
            None
        } else {
            parse_xml::<CreateBucketConfiguration>(req)?
                .location_constraint
                .filter(|c| !c.is_empty())
        };
        let default_region = &self.store.config().default_region;
        let region = constraint
            .or_else(|| ctx.region.clone())
            .unwrap_or_else(|| default_region.clone());

        match self.store.create_bucket(bucket, &region) {
            Ok(()) => {}
            Err(S3ServiceError::BucketAlreadyExists { .. }) if region == *default_region => {
                debug!(bucket, "bucket exists in default region, reusing");
            }
            Err(err) => return Err(err),
        }

        let owner = self.bucket_owner(bucket)?;
        if let Some(acl) = acl_from_headers(&req.headers, &owner)? {
            self.store.set_bucket_acl(bucket, acl)?;
        }

        Ok(BucketOutcome::Created {
            location: format!("/{bucket}"),
        })
    }

    pub(crate) fn delete_policy(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.delete_policy(bucket)?;
        Ok(BucketOutcome::Removed)
    }

    pub(crate) fn delete_lifecycle(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        self.store.delete_lifecycle(bucket)?;
        Ok(BucketOutcome::Removed)
    }

    pub(crate) fn delete_bucket(&self, bucket: &str) -> S3ServiceResult<BucketOutcome> {
        if self.store.delete_bucket(bucket)? {
            info!(bucket, "bucket deleted");
            Ok(BucketOutcome::Removed)
        } else {
            Err(S3ServiceError::BucketNotEmpty {
                bucket: bucket.to_owned(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // POST
    // -----------------------------------------------------------------------

    /// `POST ?delete`. Missing keys are reported per entry; a missing bucket
    /// fails the whole request.
    pub(crate) fn delete_objects(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let delete: Delete = parse_xml(req)?;
        self.store.get_bucket(bucket)?;

        let mut result = DeleteResult::default();
        for object in delete.objects {
            let outcome = match object.version_id.as_deref() {
                Some(version_id) => self.store.delete_key_version(bucket, &object.key, version_id),
                None => self.store.delete_key(bucket, &object.key).map(|_| ()),
            };
            match outcome {
                Ok(()) => {
                    if !delete.quiet {
                        result.deleted.push(object.key);
                    }
                }
                Err(err) if err.category() == s3emu_core::ErrorCategory::NotFound => {
                    let s3_err = err.into_s3_error();
                    result.errors.push(DeleteError {
                        key: object.key,
                        code: s3_err.code.as_str().to_owned(),
                        message: s3_err.message,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        debug!(bucket, deleted = result.deleted.len(), errors = result.errors.len(), "bulk delete");
        Ok(BucketOutcome::Deleted(result))
    }

    /// `POST /bucket` browser-form upload.
    pub(crate) fn post_object(&self, bucket: &str, req: &S3Request) -> S3ServiceResult<BucketOutcome> {
        let form = parse_form(req.header("content-type"), &req.body)?;

        let key_template = form.field("key").ok_or_else(|| S3ServiceError::InvalidArgument {
            message: "POST requires a key field".to_owned(),
        })?;
        let key = key_template.replace(
            FILENAME_PLACEHOLDER,
            form.filename.as_deref().unwrap_or_default(),
        );

        let mut metadata =
            metadata_from_pairs(form.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if metadata.content_type().is_none() {
            if let Some(content_type) = form.file_content_type.as_deref() {
                metadata.insert("content-type", content_type);
            }
        }

        let owner = self.bucket_owner(bucket)?;
        let acl = form
            .field("acl")
            .map(|name| {
                name.parse::<CannedAcl>()
                    .map(|canned| canned_acl(canned, &owner))
                    .map_err(|e| S3ServiceError::InvalidArgument {
                        message: e.to_string(),
                    })
            })
            .transpose()?;

        let options = WriteOptions {
            storage_class: form
                .field("x-amz-storage-class")
                .unwrap_or(DEFAULT_STORAGE_CLASS)
                .to_owned(),
            metadata,
            acl,
        };
        let object = self.store.put_object(bucket, &key, form.file.clone(), options)?;

        let location = format!("/{bucket}/{key}");
        let (status, document) = match form.field("success_action_status") {
            Some("200") => (StatusCode::OK, None),
            Some("201") => (
                StatusCode::CREATED,
                Some(PostResponse {
                    location: location.clone(),
                    bucket: bucket.to_owned(),
                    key: key.clone(),
                    etag: object.etag.clone(),
                }),
            ),
            _ => (StatusCode::NO_CONTENT, None),
        };

        Ok(BucketOutcome::Posted {
            status,
            object,
            location,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::super::test_support::{body, create_bucket, dispatcher, put, send};
    use super::*;

    #[test]
    fn test_should_list_buckets_sorted() {
        let d = dispatcher();
        create_bucket(&d, "zeta");
        create_bucket(&d, "alpha");
        let resp = send(&d, S3Request::new(Method::GET, "/"));
        let xml = body(&resp);
        let alpha = xml.find("<Name>alpha</Name>").unwrap_or_else(|| panic!("alpha missing: {xml}"));
        let zeta = xml.find("<Name>zeta</Name>").unwrap_or_else(|| panic!("zeta missing: {xml}"));
        assert!(alpha < zeta);
    }

    #[test]
    fn test_should_head_bucket() {
        let d = dispatcher();
        create_bucket(&d, "b");
        assert_eq!(send(&d, S3Request::new(Method::HEAD, "/b")).status, StatusCode::OK);
        assert_eq!(send(&d, S3Request::new(Method::HEAD, "/nope")).status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_resolve_create_bucket_region() {
        let d = dispatcher();

        let resp = send(&d, S3Request::new(Method::PUT, "/plain"));
        assert_eq!(resp.header("location"), Some("/plain"));
        assert_eq!(d.store().bucket_location("plain").ok().as_deref(), Some("us-east-1"));

        send(
            &d,
            S3Request::new(Method::PUT, "/")
                .with_header("host", "hosted.s3-eu-west-1.amazonaws.com"),
        );
        assert_eq!(d.store().bucket_location("hosted").ok().as_deref(), Some("eu-west-1"));

        send(
            &d,
            S3Request::new(Method::PUT, "/constrained").with_body(
                "<CreateBucketConfiguration><LocationConstraint>ap-south-1</LocationConstraint></CreateBucketConfiguration>",
            ),
        );
        let location = send(&d, S3Request::new(Method::GET, "/constrained?location"));
        assert!(body(&location).contains(">ap-south-1</LocationConstraint>"));
    }

    #[test]
    fn test_should_reuse_bucket_in_default_region_only() {
        let d = dispatcher();
        create_bucket(&d, "b");
        put(&d, "b", "k", b"data");
        create_bucket(&d, "b");
        assert!(d.store().get_key("b", "k", None).ok().flatten().is_some());

        let conflict = send(
            &d,
            S3Request::new(Method::PUT, "/b").with_body(
                "<CreateBucketConfiguration><LocationConstraint>eu-west-1</LocationConstraint></CreateBucketConfiguration>",
            ),
        );
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert!(body(&conflict).contains("<Code>BucketAlreadyExists</Code>"));
    }

    #[test]
    fn test_should_refuse_to_delete_non_empty_bucket() {
        let d = dispatcher();
        create_bucket(&d, "b");
        put(&d, "b", "k", b"data");

        let resp = send(&d, S3Request::new(Method::DELETE, "/b"));
        assert_eq!(resp.status, StatusCode::CONFLICT);
        assert!(body(&resp).contains("<Code>BucketNotEmpty</Code>"));

        send(&d, S3Request::new(Method::DELETE, "/b/k"));
        let resp = send(&d, S3Request::new(Method::DELETE, "/b"));
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        create_bucket(&d, "b");
    }

    #[test]
    fn test_should_list_objects_with_delimiter() {
        let d = dispatcher();
        create_bucket(&d, "b");
        for key in ["a/b", "a/c", "d"] {
            put(&d, "b", key, b"x");
        }

        let grouped = body(&send(&d, S3Request::new(Method::GET, "/b?prefix=&delimiter=/")));
        assert!(grouped.contains("<Key>d</Key>"));
        assert!(!grouped.contains("<Key>a/b</Key>"));
        assert!(grouped.contains("<Prefix>a/</Prefix>"));
        assert!(grouped.contains("<IsTruncated>false</IsTruncated>"));

        let flat = body(&send(&d, S3Request::new(Method::GET, "/b")));
        assert_eq!(flat.matches("<Contents>").count(), 3);
    }

    #[test]
    fn test_should_manage_policy_lifecycle_and_website() {
        let d = dispatcher();
        create_bucket(&d, "b");

        let missing = send(&d, S3Request::new(Method::GET, "/b?policy"));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert!(body(&missing).contains("NoSuchBucketPolicy"));

        let set = send(&d, S3Request::new(Method::PUT, "/b?policy").with_body("{\"Version\":\"2012-10-17\"}"));
        assert_eq!(set.status, StatusCode::NO_CONTENT);
        let got = send(&d, S3Request::new(Method::GET, "/b?policy"));
        assert_eq!(got.body.as_ref(), b"{\"Version\":\"2012-10-17\"}");
        assert_eq!(send(&d, S3Request::new(Method::DELETE, "/b?policy")).status, StatusCode::NO_CONTENT);

        let lifecycle = "<LifecycleConfiguration><Rule><ID>r1</ID><Prefix>logs/</Prefix><Status>Enabled</Status><Expiration><Days>30</Days></Expiration></Rule></LifecycleConfiguration>";
        assert!(body(&send(&d, S3Request::new(Method::GET, "/b?lifecycle"))).contains("NoSuchLifecycleConfiguration"));
        assert_eq!(
            send(&d, S3Request::new(Method::PUT, "/b?lifecycle").with_body(lifecycle)).status,
            StatusCode::OK
        );
        assert!(body(&send(&d, S3Request::new(Method::GET, "/b?lifecycle"))).contains("<ID>r1</ID>"));
        send(&d, S3Request::new(Method::DELETE, "/b?lifecycle"));
        assert_eq!(send(&d, S3Request::new(Method::GET, "/b?lifecycle")).status, StatusCode::NOT_FOUND);

        let website = "<WebsiteConfiguration><IndexDocument><Suffix>index.html</Suffix></IndexDocument></WebsiteConfiguration>";
        send(&d, S3Request::new(Method::PUT, "/b?website").with_body(website));
        assert_eq!(body(&send(&d, S3Request::new(Method::GET, "/b?website"))), website);
    }

    #[test]
    fn test_should_toggle_versioning() {
        let d = dispatcher();
        create_bucket(&d, "b");
        let unset = body(&send(&d, S3Request::new(Method::GET, "/b?versioning")));
        assert!(!unset.contains("<Status>"));

        let resp = send(
            &d,
            S3Request::new(Method::PUT, "/b?versioning")
                .with_body("<VersioningConfiguration><Status>Enabled</Status></VersioningConfiguration>"),
        );
        assert!(body(&resp).contains("<Status>Enabled</Status>"));
        let got = body(&send(&d, S3Request::new(Method::GET, "/b?versioning")));
        assert!(got.contains("<Status>Enabled</Status>"));

        let bad = send(
            &d,
            S3Request::new(Method::PUT, "/b?versioning")
                .with_body("<VersioningConfiguration><Status>Sometimes</Status></VersioningConfiguration>"),
        );
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert!(body(&bad).contains("<Code>MalformedXML</Code>"));
    }

    #[test]
    fn test_should_set_bucket_acl_from_headers() {
        let d = dispatcher();
        create_bucket(&d, "b");
        let before = body(&send(&d, S3Request::new(Method::GET, "/b?acl")));
        assert!(!before.contains("AllUsers"));

        send(&d, S3Request::new(Method::PUT, "/b?acl").with_header("x-amz-acl", "public-read"));
        let after = body(&send(&d, S3Request::new(Method::GET, "/b?acl")));
        assert!(after.contains("http://acs.amazonaws.com/groups/global/AllUsers"));
        assert!(after.contains("<Permission>READ</Permission>"));
    }

    #[test]
    fn test_should_reject_unsupported_upload_listing_params() {
        let d = dispatcher();
        create_bucket(&d, "b");
        let resp = send(&d, S3Request::new(Method::GET, "/b?uploads&delimiter=/"));
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert!(body(&resp).contains("<Code>InvalidArgument</Code>"));
        let ok = send(&d, S3Request::new(Method::GET, "/b?uploads&prefix=a"));
        assert_eq!(ok.status, StatusCode::OK);
    }

    #[test]
    fn test_should_bulk_delete_and_report_missing() {
        let d = dispatcher();
        create_bucket(&d, "b");
        put(&d, "b", "one", b"1");
        put(&d, "b", "two", b"2");

        let xml = "<Delete><Object><Key>one</Key></Object><Object><Key>ghost</Key></Object></Delete>";
        let resp = send(&d, S3Request::new(Method::POST, "/b?delete").with_body(xml));
        let report = body(&resp);
        assert!(report.contains("<Deleted><Key>one</Key></Deleted>"));
        assert!(report.contains("<Key>ghost</Key><Code>NoSuchKey</Code>"));

        let quiet = "<Delete><Quiet>true</Quiet><Object><Key>two</Key></Object></Delete>";
        let resp = send(&d, S3Request::new(Method::POST, "/b?delete").with_body(quiet));
        assert!(!body(&resp).contains("<Deleted>"));
        assert!(d.store().get_key("b", "two", None).ok().flatten().is_none());

        let malformed = send(&d, S3Request::new(Method::POST, "/b?delete").with_body("<Delete"));
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_store_form_upload() {
        let d = dispatcher();
        create_bucket(&d, "b");
        let form = "--BND\r\nContent-Disposition: form-data; name=\"key\"\r\n\r\nuploads/${filename}\r\n\
                    --BND\r\nContent-Disposition: form-data; name=\"x-amz-meta-owner\"\r\n\r\nalice\r\n\
                    --BND\r\nContent-Disposition: form-data; name=\"success_action_status\"\r\n\r\n201\r\n\
                    --BND\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n\
                    --BND--\r\n";
        let resp = send(
            &d,
            S3Request::new(Method::POST, "/b")
                .with_header("content-type", "multipart/form-data; boundary=BND")
                .with_body(form),
        );
        assert_eq!(resp.status, StatusCode::CREATED);
        assert!(body(&resp).contains("<Key>uploads/a.txt</Key>"));

        let object = d
            .store()
            .get_key("b", "uploads/a.txt", None)
            .ok()
            .flatten()
            .unwrap_or_else(|| panic!("object missing"));
        assert_eq!(object.content.as_ref(), b"hello");
        assert_eq!(object.metadata.get("x-amz-meta-owner"), Some("alice"));
        assert_eq!(object.metadata.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_should_default_form_upload_to_no_content() {
        let d = dispatcher();
        create_bucket(&d, "b");
        let resp = send(
            &d,
            S3Request::new(Method::POST, "/b")
                .with_header("content-type", "application/x-www-form-urlencoded")
                .with_body("key=plain.txt&file=abc"),
        );
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
        assert_eq!(resp.header("location"), Some("/b/plain.txt"));

        let missing_key = send(
            &d,
            S3Request::new(Method::POST, "/b")
                .with_header("content-type", "application/x-www-form-urlencoded")
                .with_body("file=abc"),
        );
        assert_eq!(missing_key.status, StatusCode::BAD_REQUEST);
    }
}
