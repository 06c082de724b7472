use super::*;
use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;

fn router() -> Router {
    let missing = Path::new("target/finsight-test-missing");
    finish(service_routes(missing), missing)
}

#[tokio::test]
async fn healthz_returns_ok() {
    assert_eq!(healthz().await, StatusCode::OK);

    let response = router()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_static_path_is_not_found() {
    let response = router()
        .oneshot(Request::builder().uri("/nope.txt").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router()
        .oneshot(Request::builder().uri("/pkg/finsight.wasm").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
