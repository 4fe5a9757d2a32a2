//! ACL resolution scenarios.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use s3emu_http::S3Request;

    use crate::{body_text, create_test_bucket, emulator, put_object, send};

    const ALL_USERS: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

    #[test]
    fn test_should_prefer_canned_acl_over_grant_headers() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "precedence");
        let resp = send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/doc"))
                .with_header("x-amz-acl", "private")
                .with_header("x-amz-grant-read", &format!("uri=\"{ALL_USERS}\""))
                .with_body("x"),
        );
        assert_eq!(resp.status, StatusCode::OK);

        let acl = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}/doc?acl"))));
        assert!(!acl.contains(ALL_USERS));
        assert!(acl.contains("<Permission>FULL_CONTROL</Permission>"));
    }

    #[test]
    fn test_should_build_acl_from_grant_headers() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "grants");
        put_object(&d, &bucket, "doc", "x");

        send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/doc?acl"))
                .with_header("x-amz-grant-read", &format!("uri=\"{ALL_USERS}\""))
                .with_header("x-amz-grant-full-control", "id=\"owner-123\""),
        );
        let acl = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}/doc?acl"))));
        assert!(acl.contains(ALL_USERS));
        assert!(acl.contains("<ID>owner-123</ID>"));
    }

    #[test]
    fn test_should_default_to_private_acl() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "private");
        put_object(&d, &bucket, "doc", "x");

        let acl = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}/doc?acl"))));
        assert_eq!(acl.matches("<Grant>").count(), 1);
        assert!(acl.contains("<Permission>FULL_CONTROL</Permission>"));

        let bucket_acl = body_text(&send(&d, S3Request::new(Method::GET, &format!("/{bucket}?acl"))));
        assert_eq!(bucket_acl.matches("<Grant>").count(), 1);
    }

    #[test]
    fn test_should_reject_unknown_canned_acl() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "badacl");
        let resp = send(
            &d,
            S3Request::new(Method::PUT, &format!("/{bucket}/doc"))
                .with_header("x-amz-acl", "world-writable")
                .with_body("x"),
        );
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }
}
