//! Bucket lifecycle scenarios.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use s3emu_core::S3Config;
    use s3emu_http::S3Request;

    use crate::{
        body_text, create_test_bucket, emulator, emulator_with, put_object, send, xml_element,
    };

    #[test]
    fn test_should_create_use_and_delete_bucket() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "lifecycle");

        let head = send(&d, S3Request::new(Method::HEAD, &format!("/{bucket}")));
        assert_eq!(head.status, StatusCode::OK);

        put_object(&d, &bucket, "a.txt", "alpha");
        let blocked = send(&d, S3Request::new(Method::DELETE, &format!("/{bucket}")));
        assert_eq!(blocked.status, StatusCode::CONFLICT);
        assert_eq!(xml_element(&body_text(&blocked), "Code").as_deref(), Some("BucketNotEmpty"));

        send(&d, S3Request::new(Method::DELETE, &format!("/{bucket}/a.txt")));
        let deleted = send(&d, S3Request::new(Method::DELETE, &format!("/{bucket}")));
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let head = send(&d, S3Request::new(Method::HEAD, &format!("/{bucket}")));
        assert_eq!(head.status, StatusCode::NOT_FOUND);
        assert!(head.body.is_empty());
    }

    #[test]
    fn test_should_list_buckets_by_name() {
        let d = emulator();
        let b1 = create_test_bucket(&d, "list1");
        let b2 = create_test_bucket(&d, "list2");

        let listing = body_text(&send(&d, S3Request::new(Method::GET, "/")));
        assert!(listing.contains(&format!("<Name>{b1}</Name>")));
        assert!(listing.contains(&format!("<Name>{b2}</Name>")));
        assert!(listing.find(&b1) < listing.find(&b2));
    }

    #[test]
    fn test_should_report_bucket_region() {
        let d = emulator_with(S3Config::builder().default_region("eu-central-1".into()).build());
        let bucket = create_test_bucket(&d, "region");
        let resp = send(&d, S3Request::new(Method::GET, &format!("/{bucket}?location")));
        assert_eq!(
            xml_element(&body_text(&resp), "LocationConstraint").as_deref(),
            Some("eu-central-1")
        );
    }

    #[test]
    fn test_should_address_bucket_by_virtual_host() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "vhost");
        put_object(&d, &bucket, "docs/readme.md", "hi");

        let resp = send(
            &d,
            S3Request::new(Method::GET, "/docs/readme.md")
                .with_header("host", &format!("{bucket}.s3.localhost:4566")),
        );
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(body_text(&resp), "hi");
    }

    #[test]
    fn test_should_group_listing_by_delimiter() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "listing");
        for key in ["photos/2024/a.jpg", "photos/2025/b.jpg", "photos/c.jpg", "readme"] {
            put_object(&d, &bucket, key, "x");
        }

        let resp = send(
            &d,
            S3Request::new(Method::GET, &format!("/{bucket}?prefix=photos/&delimiter=/")),
        );
        let xml = body_text(&resp);
        assert_eq!(xml.matches("<Contents>").count(), 1);
        assert!(xml.contains("<Key>photos/c.jpg</Key>"));
        assert!(xml.contains("<Prefix>photos/2024/</Prefix>"));
        assert!(xml.contains("<Prefix>photos/2025/</Prefix>"));
        assert!(!xml.contains("readme"));
    }

    #[test]
    fn test_should_return_not_implemented_for_unknown_combination() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "unrouted");
        let err = d
            .dispatch(&S3Request::new(Method::POST, &format!("/{bucket}/key")))
            .err()
            .unwrap_or_else(|| panic!("POST on a key without markers should not route"));
        assert!(err.is_not_implemented());
    }
}
