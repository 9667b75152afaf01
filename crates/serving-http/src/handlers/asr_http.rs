//! `POST /stream/v1/asr` (one-shot file transcription) and `GET /stream/v1/asr/health`.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use serving_core::domain::TaskId;
use serving_core::ports::TranscribeFileParams;
use serving_core::status;
use serving_engine::{decode_pcm16le, ReplicaGuard};

use crate::auth::validate_nls_token;
use crate::dto::http::{FileAsrResponse, HealthResponse, ReplicaHealth};
use crate::error::{error_response, HttpError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct FileAsrQuery {
    #[serde(default)]
    pub appkey: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

/// Strips a canonical 44-byte WAV header if present; otherwise treats the body as raw
/// PCM16LE (the one-shot endpoint accepts both, mirroring §4.5's "audio bytes" wording).
fn pcm_from_body(body: &[u8]) -> Vec<f32> {
    if body.len() > 44 && &body[0..4] == b"RIFF" && &body[8..12] == b"WAVE" {
        decode_pcm16le(&body[44..])
    } else {
        decode_pcm16le(body)
    }
}

pub async fn file_asr_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FileAsrQuery>,
    body: Bytes,
) -> Response {
    let task_id = TaskId::new();

    if let Err(err) = validate_nls_token(&state.settings, &headers) {
        return error_response(&task_id, &err);
    }
    if let Err(err) = crate::auth::validate_appkey(&state.settings, query.appkey.as_deref()) {
        return error_response(&task_id, &err);
    }

    let samples = pcm_from_body(&body);
    let params = TranscribeFileParams {
        sample_rate: query.sample_rate.unwrap_or(16_000),
        enable_punct: true,
        enable_itn: true,
        ..TranscribeFileParams::default()
    };

    let guard = ReplicaGuard::acquire(&state.pool);
    let result = match state.pool.file_asr(guard.index) {
        Ok(asr) => asr.transcribe_file(&samples, &params).await,
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(text) => Json(FileAsrResponse {
            task_id: task_id.to_string(),
            result: text,
            status: status::SUCCESS,
            message: "SUCCESS".to_string(),
        })
        .into_response(),
        Err(err) => error_response(&task_id, &HttpError::from(err)),
    }
}

pub async fn asr_health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let replicas: Vec<ReplicaHealth> = state
        .pool
        .health()
        .into_iter()
        .map(|h| ReplicaHealth {
            device: h.device,
            loaded: h.is_loaded(),
            file_asr_loaded: h.file_asr_loaded,
            streaming_asr_loaded: h.streaming_asr_loaded,
            preset_tts_loaded: h.preset_tts_loaded,
            clone_tts_loaded: h.clone_tts_loaded,
            loaded_models: h.loaded_models,
        })
        .collect();
    let healthy = replicas.iter().any(|r| r.loaded);
    Json(HealthResponse { healthy, replicas })
}
