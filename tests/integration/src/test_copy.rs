//! Copy scenarios.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use s3emu_http::S3Request;

    use crate::{body_text, create_test_bucket, emulator, get_object, put_object, send, xml_element};

    #[test]
    fn test_should_copy_independently_of_source() {
        let d = emulator();
        let src = create_test_bucket(&d, "src");
        let dst = create_test_bucket(&d, "dst");
        put_object(&d, &src, "orig", "before");

        let resp = send(
            &d,
            S3Request::new(Method::PUT, &format!("/{dst}/copy"))
                .with_header("x-amz-copy-source", &format!("/{src}/orig")),
        );
        assert_eq!(resp.status, StatusCode::OK);
        assert!(xml_element(&body_text(&resp), "ETag").is_some());

        put_object(&d, &src, "orig", "after");
        send(&d, S3Request::new(Method::DELETE, &format!("/{src}/orig")));

        assert_eq!(get_object(&d, &dst, "copy").as_deref(), Some("before"));
    }

    #[test]
    fn test_should_copy_specific_version() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "vcopy");
        crate::enable_versioning(&d, &bucket);
        let v1 = put_object(&d, &bucket, "doc", "v1");
        put_object(&d, &bucket, "doc", "v2");
        let v1_id = v1.header("x-amz-version-id").unwrap_or_default().to_owned();

        send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/restored"))
                .with_header("x-amz-copy-source", &format!("{bucket}/doc?versionId={v1_id}")),
        );
        assert_eq!(get_object(&d, &bucket, "restored").as_deref(), Some("v1"));
    }

    #[test]
    fn test_should_keep_or_replace_metadata_on_copy() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "meta");
        send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/src"))
                .with_header("content-type", "image/png")
                .with_header("x-amz-meta-origin", "camera")
                .with_body("png"),
        );

        send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/kept"))
                .with_header("x-amz-copy-source", &format!("/{bucket}/src")),
        );
        let kept = send(&d, S3Request::new(Method::HEAD, &format!("/{bucket}/kept")));
        assert_eq!(kept.header("content-type"), Some("image/png"));
        assert_eq!(kept.header("x-amz-meta-origin"), Some("camera"));

        send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/replaced"))
                .with_header("x-amz-copy-source", &format!("/{bucket}/src"))
                .with_header("x-amz-metadata-directive", "REPLACE")
                .with_header("x-amz-meta-origin", "scanner"),
        );
        let replaced = send(&d, S3Request::new(Method::HEAD, &format!("/{bucket}/replaced")));
        assert_eq!(replaced.header("x-amz-meta-origin"), Some("scanner"));
        assert_eq!(replaced.header("content-type"), Some("binary/octet-stream"));
    }

    #[test]
    fn test_should_fail_copy_from_missing_source() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "missing");
        let resp = send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/copy"))
                .with_header("x-amz-copy-source", &format!("/{bucket}/ghost")),
        );
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(xml_element(&body_text(&resp), "Code").as_deref(), Some("NoSuchKey"));
    }
}
