//! Multipart upload scenarios.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use s3emu_http::{S3Dispatcher, S3Request};

    use crate::{body_text, create_test_bucket, emulator, get_object, put_object, send, xml_element};

    fn initiate(d: &S3Dispatcher, bucket: &str, key: &str) -> String {
        let resp = send(d, S3Request::new(Method::POST, &format!("/{bucket}/{key}?uploads")));
        xml_element(&body_text(&resp), "UploadId")
            .unwrap_or_else(|| panic!("no upload id: {}", body_text(&resp)))
    }

    fn upload_part(d: &S3Dispatcher, bucket: &str, key: &str, id: &str, n: u32, data: String) -> String {
        let resp = send(
            d,
            S3Request::new(Method::PUT, &format!("/{bucket}/{key}?partNumber={n}&uploadId={id}"))
                .with_body(data),
        );
        assert_eq!(resp.status, StatusCode::OK, "{}", body_text(&resp));
        resp.header("etag").unwrap_or_default().to_owned()
    }

    fn complete(d: &S3Dispatcher, bucket: &str, key: &str, id: &str, parts: &[(u32, String)]) -> String {
        let parts: String = parts
            .iter()
            .map(|(n, etag)| format!("<Part><PartNumber>{n}</PartNumber><ETag>{etag}</ETag></Part>"))
            .collect();
        let resp = send(
            d,
            S3Request::new(Method::POST, &format!("/{bucket}/{key}?uploadId={id}"))
                .with_body(format!("<CompleteMultipartUpload>{parts}</CompleteMultipartUpload>")),
        );
        body_text(&resp)
    }

    #[test]
    fn test_should_upload_in_parts() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "multipart");
        let id = initiate(&d, &bucket, "video.bin");

        let chunk1 = "a".repeat(1024);
        let chunk2 = "b".repeat(512);
        let e1 = upload_part(&d, &bucket, "video.bin", &id, 1, chunk1.clone());
        let e2 = upload_part(&d, &bucket, "video.bin", &id, 2, chunk2.clone());

        let pending = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}?uploads"))));
        assert!(pending.contains(&id));

        let result = complete(&d, &bucket, "video.bin", &id, &[(1, e1), (2, e2)]);
        assert_eq!(xml_element(&result, "Key").as_deref(), Some("video.bin"));

        assert_eq!(get_object(&d, &bucket, "video.bin"), Some(format!("{chunk1}{chunk2}")));
        let pending = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}?uploads"))));
        assert!(!pending.contains(&id));
    }

    #[test]
    fn test_should_replace_reuploaded_part() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "reupload");
        let id = initiate(&d, &bucket, "k");
        upload_part(&d, &bucket, "k", &id, 1, "stale".to_owned());
        let fresh = upload_part(&d, &bucket, "k", &id, 1, "fresh".to_owned());

        let parts = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}/k?uploadId={id}"))));
        assert_eq!(parts.matches("<Part>").count(), 1);

        complete(&d, &bucket, "k", &id, &[(1, fresh)]);
        assert_eq!(get_object(&d, &bucket, "k").as_deref(), Some("fresh"));
    }

    #[test]
    fn test_should_reject_out_of_order_completion() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "order");
        let id = initiate(&d, &bucket, "k");
        let e1 = upload_part(&d, &bucket, "k", &id, 1, "one".to_owned());
        let e2 = upload_part(&d, &bucket, "k", &id, 2, "two".to_owned());

        let result = complete(&d, &bucket, "k", &id, &[(2, e2.clone()), (1, e1.clone())]);
        assert_eq!(xml_element(&result, "Code").as_deref(), Some("InvalidPartOrder"));
        assert!(get_object(&d, &bucket, "k").is_none());

        complete(&d, &bucket, "k", &id, &[(1, e1), (2, e2)]);
        assert_eq!(get_object(&d, &bucket, "k").as_deref(), Some("onetwo"));
    }

    #[test]
    fn test_should_abort_upload() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "abort");
        let id = initiate(&d, &bucket, "k");
        upload_part(&d, &bucket, "k", &id, 1, "data".to_owned());

        let resp = send(&d, S3Request::new(Method::DELETE, &format!("/{bucket}/k?uploadId={id}")));
        assert_eq!(resp.status, StatusCode::NO_CONTENT);

        let parts = send(&d, S3Request::new(Method::GET, &format!("/{bucket}/k?uploadId={id}")));
        assert_eq!(xml_element(&body_text(&parts), "Code").as_deref(), Some("NoSuchUpload"));
    }

    #[test]
    fn test_should_build_part_from_existing_object() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "partcopy");
        put_object(&d, &bucket, "source", "0123456789");
        let id = initiate(&d, &bucket, "target");

        let copied = send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/target?partNumber=1&uploadId={id}"))
                .with_header("x-amz-copy-source", &format!("/{bucket}/source"))
                .with_header("x-amz-copy-source-range", "bytes=0-4"),
        );
        let etag = xml_element(&body_text(&copied), "ETag")
            .unwrap_or_else(|| panic!("no etag: {}", body_text(&copied)));
        let e2 = upload_part(&d, &bucket, "target", &id, 2, "!".to_owned());

        complete(&d, &bucket, "target", &id, &[(1, etag), (2, e2)]);
        assert_eq!(get_object(&d, &bucket, "target").as_deref(), Some("01234!"));
    }
}
