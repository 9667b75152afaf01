//! Integration tests for the async TTS submit/query endpoints (§4.6, §6.2 `/rest/v1/tts/async`).

mod common;

use http_body_util::BodyExt;
use hyper::StatusCode;
use tower::ServiceExt;

use axum::body::Body;
use axum::http::Request;

#[tokio::test]
async fn submit_then_query_reports_a_running_task() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let submit_body = serde_json::json!({
        "header": {},
        "payload": {"text": "你好，世界。", "voice": "中文女"}
    });
    let submit_response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rest/v1/tts/async")
                .header("content-type", "application/json")
                .body(Body::from(submit_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(submit_response.status(), StatusCode::OK);
    let body = submit_response.into_body().collect().await.unwrap().to_bytes();
    let submitted: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let task_id = submitted["data"]["task_id"].as_str().unwrap().to_string();
    assert_eq!(submitted["error_message"], "RUNNING");

    let query_response = router
        .oneshot(
            Request::builder()
                .uri(format!("/rest/v1/tts/async?task_id={task_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(query_response.status(), StatusCode::OK);
    let body = query_response.into_body().collect().await.unwrap().to_bytes();
    let queried: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(queried["task_id"], task_id);
    assert_eq!(queried["error_message"], "RUNNING");
}

#[tokio::test]
async fn query_unknown_task_id_is_a_client_error() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/rest/v1/tts/async?task_id=0000000000000000000000000000000a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_with_empty_voice_is_rejected() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let submit_body = serde_json::json!({
        "header": {},
        "payload": {"text": "你好，世界。", "voice": "   "}
    });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rest/v1/tts/async")
                .header("content-type", "application/json")
                .body(Body::from(submit_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_with_non_http_notify_url_is_rejected() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let submit_body = serde_json::json!({
        "header": {},
        "payload": {
            "text": "你好，世界。",
            "voice": "中文女",
            "enable_notify": true,
            "notify_url": "ftp://example.com/callback"
        }
    });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rest/v1/tts/async")
                .header("content-type", "application/json")
                .body(Body::from(submit_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_over_max_text_length_is_rejected() {
    let settings = common::settings_no_auth();
    let max_len = settings.max_text_length;
    let ctx = common::test_context(settings).await;
    let router = serving_http::build_router(ctx);

    let too_long = "a".repeat(max_len + 1);
    let submit_body = serde_json::json!({
        "header": {},
        "payload": {"text": too_long, "voice": "中文女"}
    });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rest/v1/tts/async")
                .header("content-type", "application/json")
                .body(Body::from(submit_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
