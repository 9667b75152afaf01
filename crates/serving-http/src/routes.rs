//! Route table (§6.2). Not nested under `/api` — these paths mirror the wire spec's
//! URL layout exactly, since compatibility with existing clients depends on it.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::bootstrap::AppContext;
use crate::handlers::{asr_http, asr_ws, async_tts, tts_http, tts_ws};
use crate::state::AppState;

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = crate::bootstrap::build_cors_layer(&ctx.cors);
    let temp_dir = ctx.settings.temp_dir.clone();
    let state: AppState = ctx;

    Router::new()
        .route("/ws/v1/asr", get(asr_ws::asr_ws_handler))
        .route("/ws/v1/tts", get(tts_ws::tts_ws_handler))
        .route("/stream/v1/asr", post(asr_http::file_asr_handler))
        .route("/stream/v1/asr/health", get(asr_http::asr_health_handler))
        .route("/stream/v1/tts", post(tts_http::file_tts_handler))
        .route("/stream/v1/tts/health", get(tts_http::tts_health_handler))
        .route("/stream/v1/tts/voices", get(tts_http::voices_handler))
        .route("/stream/v1/tts/voices/info", get(tts_http::voices_handler))
        .route("/stream/v1/tts/voices/refresh", post(tts_http::voices_refresh_handler))
        .route("/openai/v1/audio/speech", post(tts_http::openai_speech_handler))
        .route("/rest/v1/tts/async", post(async_tts::submit_handler).get(async_tts::query_handler))
        .route("/health", get(health_check))
        .nest_service("/tmp", ServeDir::new(temp_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
