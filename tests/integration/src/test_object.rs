//! Object read, write and range scenarios.

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use s3emu_http::{S3Request, StreamPhase};

    use crate::{body_text, create_test_bucket, emulator, get_object, put_object, send, xml_element};

    #[test]
    fn test_should_serve_byte_ranges() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "range");
        put_object(&d, &bucket, "digits", "0123456789");
        let path = format!("/{bucket}/digits");

        let cases = [
            ("bytes=0-3", "0123", "bytes 0-3/10"),
            ("bytes=7-", "789", "bytes 7-9/10"),
            ("bytes=-2", "89", "bytes 8-9/10"),
            ("bytes=5-100", "56789", "bytes 5-9/10"),
        ];
        for (range, expected, content_range) in cases {
            let resp = send(&d, S3Request::new(Method::GET, &path).with_header("range", range));
            assert_eq!(resp.status, StatusCode::PARTIAL_CONTENT, "{range}");
            assert_eq!(body_text(&resp), expected, "{range}");
            assert_eq!(resp.header("content-range"), Some(content_range), "{range}");
            assert_eq!(
                resp.header("content-length"),
                Some(expected.len().to_string().as_str()),
                "{range}"
            );
        }

        let beyond = send(&d, S3Request::new(Method::GET, &path).with_header("range", "bytes=10-"));
        assert_eq!(beyond.status, StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[test]
    fn test_should_bulk_delete_with_per_key_errors() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "bulk");
        put_object(&d, &bucket, "keep", "1");
        put_object(&d, &bucket, "drop", "2");

        let resp = send(
            &d,
            S3Request::new(Method::POST, &format!("/{bucket}?delete")).with_body(
                "<Delete><Object><Key>drop</Key></Object><Object><Key>missing</Key></Object></Delete>",
            ),
        );
        assert_eq!(resp.status, StatusCode::OK);
        let xml = body_text(&resp);
        assert!(xml.contains("<Deleted><Key>drop</Key></Deleted>"));
        assert!(xml.contains("<Code>NoSuchKey</Code>"));

        assert_eq!(get_object(&d, &bucket, "keep").as_deref(), Some("1"));
        assert!(get_object(&d, &bucket, "drop").is_none());
    }

    #[test]
    fn test_should_assemble_streamed_object() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "stream");
        let path = format!("/{bucket}/log.txt");

        for (phase, chunk) in [
            (StreamPhase::Open, "line1\n"),
            (StreamPhase::Append, "line2\n"),
            (StreamPhase::Close, "line3\n"),
        ] {
            let resp = send(&d, S3Request::new(Method::PUT, &path).with_phase(phase).with_body(chunk));
            assert_eq!(resp.status, StatusCode::OK, "{}", body_text(&resp));
        }

        assert_eq!(get_object(&d, &bucket, "log.txt").as_deref(), Some("line1\nline2\nline3\n"));
    }

    #[test]
    fn test_should_accept_form_upload() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "form");
        let body = concat!(
            "--frontier\r\n",
            "Content-Disposition: form-data; name=\"key\"\r\n\r\n",
            "inbox/${filename}\r\n",
            "--frontier\r\n",
            "Content-Disposition: form-data; name=\"success_action_status\"\r\n\r\n",
            "201\r\n",
            "--frontier\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "remember the milk\r\n",
            "--frontier--\r\n",
        );
        let resp = send(
            &d,
            S3Request::new(Method::POST, &format!("/{bucket}"))
                .with_header("content-type", "multipart/form-data; boundary=frontier")
                .with_body(body),
        );
        assert_eq!(resp.status, StatusCode::CREATED);
        assert_eq!(xml_element(&body_text(&resp), "Key").as_deref(), Some("inbox/note.txt"));
        assert_eq!(
            get_object(&d, &bucket, "inbox/note.txt").as_deref(),
            Some("remember the milk")
        );
    }

    #[test]
    fn test_should_track_restore_status() {
        let d = emulator();
        let bucket = create_test_bucket(&d, "restore");
        put_object(&d, &bucket, "archive", "old");
        let path = format!("/{bucket}/archive?restore");
        let request = "<RestoreRequest><Days>1</Days></RestoreRequest>";

        let first = send(&d, S3Request::new(Method::POST, &path).with_body(request));
        assert_eq!(first.status, StatusCode::ACCEPTED);
        let repeat = send(&d, S3Request::new(Method::POST, &path).with_body(request));
        assert_eq!(repeat.status, StatusCode::OK);
    }
}
