//! Integration tests for the one-shot HTTP endpoints (§4.5) and health/voice routes.

mod common;

use http_body_util::BodyExt;
use hyper::StatusCode;
use tower::ServiceExt;

use axum::body::Body;
use axum::http::Request;

#[tokio::test]
async fn health_route_reports_ok() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn asr_health_reports_one_loaded_replica() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let response = router
        .oneshot(Request::builder().uri("/stream/v1/asr/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["healthy"], true);
    assert_eq!(json["replicas"][0]["file_asr_loaded"], true);
}

#[tokio::test]
async fn file_asr_transcribes_silent_audio_as_empty_result() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stream/v1/asr")
                .body(Body::from(vec![0u8; 320]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["result"], "");
}

#[tokio::test]
async fn file_asr_requires_token_when_auth_is_configured() {
    let ctx = common::test_context(common::settings_with_token("a-long-enough-token")).await;
    let router = serving_http::build_router(ctx);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stream/v1/asr")
                .body(Body::from(vec![0u8; 320]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_tts_rejects_unknown_voice() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let request_body = serde_json::json!({
        "text": "你好",
        "voice": "不存在的声音",
    });

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stream/v1/tts")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_tts_synthesizes_known_preset_voice() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let request_body = serde_json::json!({
        "text": "你好，世界。",
        "voice": "中文女",
        "format": "WAV",
    });

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stream/v1/tts")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.len() > 44, "expected WAV header plus audio samples");
    assert_eq!(&body[0..4], b"RIFF");
}

#[tokio::test]
async fn voices_endpoint_lists_the_stub_catalog() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let router = serving_http::build_router(ctx);

    let response = router
        .oneshot(Request::builder().uri("/stream/v1/tts/voices").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["preset_voices"].as_array().unwrap().contains(&serde_json::json!("中文女")));
    assert!(json["clone_voices"].as_array().unwrap().contains(&serde_json::json!("demo")));
}

#[tokio::test]
async fn openai_speech_requires_bearer_token_when_auth_is_configured() {
    let ctx = common::test_context(common::settings_with_token("a-long-enough-token")).await;
    let router = serving_http::build_router(ctx);

    let request_body = serde_json::json!({
        "model": "tts-1",
        "input": "hello there",
        "voice": "中文女",
    });

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/openai/v1/audio/speech")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
