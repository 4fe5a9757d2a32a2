//! Scenarios driven through the hyper service adapter.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::{Method, StatusCode};
    use http_body_util::{BodyExt, Full};
    use hyper::service::Service;
    use s3emu_http::{S3HttpService, S3Request};

    use crate::{body_text, emulator, send};

    fn request(method: Method, uri: &str, body: &'static str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "localhost:4566")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap_or_else(|e| panic!("request: {e}"))
    }

    async fn call(svc: &S3HttpService, req: http::Request<Full<Bytes>>) -> (StatusCode, String) {
        let resp = svc.call(req).await.unwrap_or_else(|e| match e {});
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap_or_else(|e| match e {})
            .to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_should_round_trip_through_service() {
        let svc = S3HttpService::new(emulator());

        let (status, _) = call(&svc, request(Method::PUT, "/served", "")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&svc, request(Method::PUT, "/served/hello.txt", "hello")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&svc, request(Method::GET, "/served/hello.txt", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello");

        let (status, body) = call(&svc, request(Method::GET, "/served?prefix=hel", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<Key>hello.txt</Key>"));
    }

    #[tokio::test]
    async fn test_should_answer_unrouted_request_with_501() {
        let svc = S3HttpService::new(emulator());
        let (status, body) = call(&svc, request(Method::POST, "/bucket/key", "")).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body.contains("<Code>NotImplemented</Code>"));
    }

    #[tokio::test]
    async fn test_should_share_store_between_service_and_dispatcher() {
        let dispatcher = Arc::new(emulator());
        let svc = S3HttpService::from_shared(Arc::clone(&dispatcher));

        call(&svc, request(Method::PUT, "/shared", "")).await;
        call(&svc, request(Method::PUT, "/shared/note", "from the wire")).await;

        let resp = send(&dispatcher, S3Request::new(Method::GET, "/shared/note"));
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(body_text(&resp), "from the wire");
    }
}
