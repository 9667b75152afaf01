//! One-shot TTS endpoints: `POST /stream/v1/tts`, the OpenAI-compatible
//! `POST /openai/v1/audio/speech`, `GET /stream/v1/tts/health`,
//! `GET /stream/v1/tts/voices[/info]`, and `POST /stream/v1/tts/voices/refresh` (§4.5).

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serving_core::domain::{TaskId, TtsFormat};
use serving_engine::{build_clone_prompt, encode_pcm16le, wrap_wav, ReplicaGuard};

use crate::auth::{validate_bearer_token, validate_nls_token};
use crate::dto::http::{FileTtsRequest, OpenAiSpeechRequest, VoiceListResponse, VoiceRefreshResponse};
use crate::error::{error_response, HttpError};
use crate::state::AppState;

fn parse_format(raw: Option<&str>) -> TtsFormat {
    match raw.map(str::to_ascii_uppercase).as_deref() {
        Some("WAV") => TtsFormat::Wav,
        Some("MP3") => TtsFormat::Mp3,
        _ => TtsFormat::Pcm,
    }
}

fn content_type_for(format: TtsFormat) -> &'static str {
    match format {
        TtsFormat::Pcm => "audio/L16",
        TtsFormat::Wav | TtsFormat::Mp3 => "audio/wav",
    }
}

async fn synthesize_one_shot(
    state: &AppState,
    text: &str,
    voice: &str,
    format: TtsFormat,
    sample_rate: u32,
    speed: f32,
    volume: u8,
    prompt: Option<&str>,
) -> Result<Vec<u8>, HttpError> {
    let guard = ReplicaGuard::acquire(&state.pool);
    let pool = &state.pool;

    let routed_to_clone = pool.clone_tts(guard.index).ok().is_some_and(|c| c.has_voice(voice));
    let chunks = if routed_to_clone {
        let clone = pool.clone_tts(guard.index)?;
        let built_prompt = build_clone_prompt(prompt, state.settings.clone_model_version);
        clone.synthesize_clone(text, voice, speed, sample_rate, volume, built_prompt.as_deref(), format).await?
    } else {
        let preset = pool.preset_tts(guard.index)?;
        if !preset.has_voice(voice) {
            return Err(serving_core::CoreError::InvalidParameter(format!("unknown voice: {voice}")).into());
        }
        preset.synthesize_preset(text, voice, speed, sample_rate, volume, format).await?
    };

    let samples: Vec<f32> = chunks.into_iter().flatten().collect();
    let pcm = encode_pcm16le(&samples);
    Ok(match format {
        TtsFormat::Pcm => pcm,
        TtsFormat::Wav | TtsFormat::Mp3 => wrap_wav(&pcm, sample_rate),
    })
}

pub async fn file_tts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FileTtsRequest>,
) -> Response {
    let task_id = TaskId::new();
    if let Err(err) = validate_nls_token(&state.settings, &headers) {
        return error_response(&task_id, &err);
    }
    if let Err(err) = crate::auth::validate_appkey(&state.settings, req.appkey.as_deref()) {
        return error_response(&task_id, &err);
    }

    let format = parse_format(req.format.as_deref());
    let sample_rate = req.sample_rate.unwrap_or(16_000);

    let audio = synthesize_one_shot(
        &state,
        &req.text,
        &req.voice,
        format,
        sample_rate,
        1.0 + f32::from(req.speech_rate.unwrap_or(0).clamp(-500, 500)) / 500.0,
        req.volume.unwrap_or(50),
        req.prompt.as_deref(),
    )
    .await;

    match audio {
        Ok(bytes) => {
            ([(header::CONTENT_TYPE, content_type_for(format))], bytes).into_response()
        }
        Err(err) => error_response(&task_id, &err),
    }
}

pub async fn openai_speech_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<OpenAiSpeechRequest>,
) -> Response {
    let task_id = TaskId::new();
    if let Err(err) = validate_bearer_token(&state.settings, &headers) {
        return error_response(&task_id, &err);
    }

    let format = parse_format(req.response_format.as_deref());
    let audio = synthesize_one_shot(
        &state,
        &req.input,
        &req.voice,
        format,
        24_000,
        req.speed.unwrap_or(1.0).max(0.1),
        50,
        req.instructions.as_deref(),
    )
    .await;

    match audio {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(format))], bytes).into_response(),
        Err(err) => error_response(&task_id, &err),
    }
}

pub async fn tts_health_handler(State(state): State<AppState>) -> Json<crate::dto::http::HealthResponse> {
    super::asr_http::asr_health_handler(State(state)).await
}

pub async fn voices_handler(State(state): State<AppState>) -> Json<VoiceListResponse> {
    Json(VoiceListResponse {
        preset_voices: state.voice_registry.preset_voices(),
        clone_voices: state.voice_registry.clone_voices(),
    })
}

pub async fn voices_refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.voice_registry.refresh(&state.pool);
    (
        StatusCode::OK,
        Json(VoiceRefreshResponse {
            preset_voice_count: state.voice_registry.preset_voices().len(),
            clone_voice_count: state.voice_registry.clone_voices().len(),
        }),
    )
}
