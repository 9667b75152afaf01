//! `POST /rest/v1/tts/async` (submit) and `GET /rest/v1/tts/async` (query) (§4.6).

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;

use serving_core::domain::{AsyncTtsTask, AsyncTtsTaskStatus, TaskId, TtsFormat};
use serving_core::status;

use crate::auth::{validate_appkey, validate_nls_token};
use crate::dto::http::{
    AsyncTtsQueryParams, AsyncTtsQueryResponse, AsyncTtsSubmitData, AsyncTtsSubmitRequest, AsyncTtsSubmitResponse,
};
use crate::error::{error_response, HttpError};
use crate::state::AppState;

fn parse_format(raw: Option<&str>) -> TtsFormat {
    match raw.map(str::to_ascii_uppercase).as_deref() {
        Some("WAV") => TtsFormat::Wav,
        Some("MP3") => TtsFormat::Mp3,
        _ => TtsFormat::Pcm,
    }
}

fn notify_url_is_http(url: Option<&str>) -> bool {
    url.is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"))
}

pub async fn submit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AsyncTtsSubmitRequest>,
) -> Response {
    let task_id = TaskId::new();
    if let Err(err) = validate_nls_token(&state.settings, &headers) {
        return error_response(&task_id, &err);
    }
    if let Err(err) = validate_appkey(&state.settings, req.header.appkey.as_deref()) {
        return error_response(&task_id, &err);
    }
    if req.payload.text.len() > state.settings.max_text_length {
        let err: HttpError =
            serving_core::CoreError::InvalidParameter("text exceeds MAX_TEXT_LENGTH".to_string()).into();
        return error_response(&task_id, &err);
    }
    if req.payload.voice.trim().is_empty() {
        let err: HttpError = serving_core::CoreError::InvalidParameter("voice must not be empty".to_string()).into();
        return error_response(&task_id, &err);
    }
    if req.payload.enable_notify.unwrap_or(false) && !notify_url_is_http(req.payload.notify_url.as_deref()) {
        let err: HttpError =
            serving_core::CoreError::InvalidParameter("notify_url must be http or https".to_string()).into();
        return error_response(&task_id, &err);
    }

    let task = AsyncTtsTask::new_running(
        task_id.to_string(),
        req.payload.text,
        req.payload.voice,
        req.payload.sample_rate.unwrap_or(16_000),
        parse_format(req.payload.format.as_deref()),
        req.payload.enable_subtitle.unwrap_or(false),
        req.payload.enable_notify.unwrap_or(false),
        req.payload.notify_url,
    );

    if let Err(err) = state.task_store.insert(&task).await {
        return error_response(&task_id, &HttpError::from(err));
    }

    Json(AsyncTtsSubmitResponse {
        status: 200,
        error_code: status::SUCCESS,
        error_message: "RUNNING".to_string(),
        request_id: task.request_id.clone(),
        data: AsyncTtsSubmitData { task_id: task.task_id.to_string() },
    })
    .into_response()
}

pub async fn query_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AsyncTtsQueryParams>,
) -> Response {
    let task_id_param = serving_core::domain::TaskId::from(params.task_id.clone());

    if let Err(err) = validate_nls_token(&state.settings, &headers) {
        return error_response(&task_id_param, &err);
    }
    if let Err(err) = validate_appkey(&state.settings, params.appkey.as_deref()) {
        return error_response(&task_id_param, &err);
    }

    let task = match state.task_store.find(&task_id_param).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            let err: HttpError = serving_core::CoreError::TaskNotFound(params.task_id).into();
            return error_response(&task_id_param, &err);
        }
        Err(err) => return error_response(&task_id_param, &HttpError::from(err)),
    };

    let (error_code, error_message) = match task.status {
        AsyncTtsTaskStatus::Running => (status::SUCCESS, "RUNNING".to_string()),
        AsyncTtsTaskStatus::Success => (status::SUCCESS, "SUCCESS".to_string()),
        AsyncTtsTaskStatus::Failed => {
            (task.error_code.unwrap_or(status::DEFAULT_SERVER_ERROR), task.error_message.unwrap_or_default())
        }
    };

    Json(AsyncTtsQueryResponse {
        status: 200,
        error_code,
        error_message,
        task_id: task.task_id.to_string(),
        audio_address: task.audio_address,
        sentences: task.sentences,
        notify_custom: task.notify_url,
    })
    .into_response()
}
