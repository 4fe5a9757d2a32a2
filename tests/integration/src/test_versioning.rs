//! Versioning scenarios.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use s3emu_http::S3Request;

    use crate::{
        body_text, create_test_bucket, emulator, enable_versioning, get_object, put_object, send,
        xml_element,
    };

    #[test]
    fn test_should_keep_every_version() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "versions");
        enable_versioning(&d, &bucket);

        let v1 = put_object(&d, &bucket, "doc", "first");
        let v2 = put_object(&d, &bucket, "doc", "second");
        let v1_id = v1.header("x-amz-version-id").unwrap_or_default().to_owned();
        let v2_id = v2.header("x-amz-version-id").unwrap_or_default().to_owned();
        assert!(!v1_id.is_empty());
        assert_ne!(v1_id, v2_id);

        assert_eq!(get_object(&d, &bucket, "doc").as_deref(), Some("second"));
        let old = send(&d, S3Request::new(Method::GET, &format!("/{bucket}/doc?versionId={v1_id}")));
        assert_eq!(body_text(&old), "first");

        let listing = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}?versions"))));
        assert_eq!(listing.matches("<Version>").count(), 2);
        assert_eq!(listing.matches("<IsLatest>true</IsLatest>").count(), 1);
        assert!(listing.contains(&v1_id));
        assert!(listing.contains(&v2_id));
    }

    #[test]
    fn test_should_hide_object_behind_delete_marker() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "markers");
        enable_versioning(&d, &bucket);
        put_object(&d, &bucket, "doc", "content");

        let deleted = send(&d, S3Request::new(Method::DELETE, &format!("/{bucket}/doc")));
        assert_eq!(deleted.header("x-amz-delete-marker"), Some("true"));
        let marker_id = deleted
            .header("x-amz-version-id")
            .unwrap_or_else(|| panic!("delete marker should carry a version"))
            .to_owned();

        assert!(get_object(&d, &bucket, "doc").is_none());
        let listing = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}"))));
        assert!(!listing.contains("<Key>doc</Key>"));

        let versions = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}?versions"))));
        assert!(versions.contains("<DeleteMarker>"));

        send(
            &d,
            S3Request::new(Method::DELETE, &format!("/{bucket}/doc?versionId={marker_id}")),
        );
        assert_eq!(get_object(&d, &bucket, "doc").as_deref(), Some("content"));
    }

    #[test]
    fn test_should_overwrite_null_version_when_suspended() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "suspend");
        enable_versioning(&d, &bucket);
        let kept = put_object(&d, &bucket, "doc", "versioned");
        let kept_id = kept.header("x-amz-version-id").unwrap_or_default().to_owned();

        let resp = send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}?versioning"))
                .with_body("<VersioningConfiguration><Status>Suspended</Status></VersioningConfiguration>"),
        );
        assert_eq!(xml_element(&body_text(&resp), "Status").as_deref(), Some("Suspended"));

        let null_write = put_object(&d, &bucket, "doc", "one");
        assert!(null_write.header("x-amz-version-id").is_none());
        put_object(&d, &bucket, "doc", "two");

        assert_eq!(get_object(&d, &bucket, "doc").as_deref(), Some("two"));
        let old = send(&d, S3Request::new(Method::GET, &format!("/{bucket}/doc?versionId={kept_id}")));
        assert_eq!(old.status, StatusCode::OK);
        assert_eq!(body_text(&old), "versioned");

        let listing = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}?versions"))));
        assert_eq!(listing.matches("<Version>").count(), 2);
    }
}
