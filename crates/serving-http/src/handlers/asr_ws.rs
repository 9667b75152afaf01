//! `GET /ws/v1/asr` — streaming ASR WebSocket handler (§4.3, §6.2).
//!
//! One sequential task per session: frames are read, fully processed (including any
//! engine calls), and their resulting events are sent, in strict arrival order — the
//! ordering guarantees in §5 make a duplex split-task design unnecessary here.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use serving_core::domain::{AsrParams, TaskId};
use serving_core::protocol::{Envelope, Header, Namespace};
use serving_core::status;

use crate::asr_session::{AsrEvent, AsrSession};
use crate::auth::validate_nls_token;
use crate::dto::egress::{
    Empty, SentenceBeginPayload, SentenceEndPayload, TranscriptionResultChangedPayload,
    TranscriptionStartedPayload,
};
use crate::dto::ingress::{ClientEnvelope, StartTranscriptionPayload};
use crate::state::AppState;

pub async fn asr_ws_handler(State(state): State<AppState>, headers: HeaderMap, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, headers))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, headers: HeaderMap) {
    let task_id = TaskId::new();

    if let Err(err) = validate_nls_token(&state.settings, &headers) {
        send_task_failed(&mut socket, &task_id, &err.status_text()).await;
        return;
    }

    let mut engine_index: Option<usize> = None;
    let mut session: Option<AsrSession> = None;

    loop {
        let Some(msg) = socket.recv().await else { break };
        let msg = match msg {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(%task_id, error = %err, "ASR WS recv error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                if !handle_control(&text, &mut socket, &state, &task_id, &mut engine_index, &mut session).await {
                    break;
                }
            }
            Message::Binary(bytes) => {
                let Some(active) = session.as_mut() else {
                    send_task_failed(&mut socket, &task_id, "binary frame received before StartTranscription")
                        .await;
                    break;
                };
                active.push_audio(&bytes);
                match active.drain_available_chunks(&state.pool, &state.settings, &state.executor).await {
                    Ok(events) => {
                        if !send_events(&mut socket, &task_id, events).await {
                            break;
                        }
                    }
                    Err(err) => {
                        send_task_failed(&mut socket, &task_id, &err.status_text()).await;
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    if let Some(idx) = engine_index {
        state.pool.release(idx);
    }
}

/// Handles one control (JSON text) message. Returns `false` when the session should
/// end (either normal `StopTranscription` completion or a fatal error).
async fn handle_control(
    text: &str,
    socket: &mut WebSocket,
    state: &AppState,
    task_id: &TaskId,
    engine_index: &mut Option<usize>,
    session: &mut Option<AsrSession>,
) -> bool {
    let envelope: ClientEnvelope = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => {
            send_task_failed(socket, task_id, &format!("invalid message: {err}")).await;
            return false;
        }
    };

    match envelope.header.name.as_str() {
        "StartTranscription" if session.is_none() => {
            let payload: StartTranscriptionPayload = serde_json::from_value(envelope.payload).unwrap_or_default();
            let sample_rate = payload.sample_rate.unwrap_or(16_000);
            if !AsrParams::is_supported_sample_rate(sample_rate) {
                send_task_failed(socket, task_id, &format!("unsupported sample rate: {sample_rate}")).await;
                return false;
            }
            let params = AsrParams {
                sample_rate,
                enable_intermediate_result: payload.enable_intermediate_result.unwrap_or(true),
                enable_punctuation_prediction: payload.enable_punctuation_prediction.unwrap_or(true),
                enable_inverse_text_normalization: payload.enable_inverse_text_normalization.unwrap_or(true),
                max_sentence_silence_ms: payload.max_sentence_silence.unwrap_or(800),
            };

            let index = state.pool.select();
            *engine_index = Some(index);
            let session_id = format!("session_{task_id}");
            *session = Some(AsrSession::new(task_id.clone(), session_id.clone(), params, index));

            send_envelope(
                socket,
                task_id,
                Namespace::SpeechTranscriber,
                "TranscriptionStarted",
                TranscriptionStartedPayload { session_id },
            )
            .await
        }
        "StopTranscription" if session.is_some() => {
            let active = session.as_mut().expect("checked Some above");
            match active.stop(&state.pool, &state.settings, &state.executor).await {
                Ok(events) => send_events(socket, task_id, events).await,
                Err(err) => {
                    send_task_failed(socket, task_id, &err.status_text()).await;
                    false
                }
            }
        }
        other => {
            send_task_failed(socket, task_id, &format!("unexpected message in current state: {other}")).await;
            false
        }
    }
}

/// Sends every event produced by the session FSM. Returns `false` as soon as a send
/// fails (WS closed client-side) or a terminal event (`Completed`) was sent.
async fn send_events(socket: &mut WebSocket, task_id: &TaskId, events: Vec<AsrEvent>) -> bool {
    for event in events {
        let ok = match event {
            AsrEvent::SentenceBegin { index, time_ms } => {
                send_envelope(
                    socket,
                    task_id,
                    Namespace::SpeechTranscriber,
                    "SentenceBegin",
                    SentenceBeginPayload { index, time: time_ms },
                )
                .await
            }
            AsrEvent::ResultChanged { index, time_ms, result } => {
                send_envelope(
                    socket,
                    task_id,
                    Namespace::SpeechTranscriber,
                    "TranscriptionResultChanged",
                    TranscriptionResultChangedPayload { index, time: time_ms, result },
                )
                .await
            }
            AsrEvent::SentenceEnd { index, time_ms, result, begin_time_ms } => {
                send_envelope(
                    socket,
                    task_id,
                    Namespace::SpeechTranscriber,
                    "SentenceEnd",
                    SentenceEndPayload { index, time: time_ms, result, begin_time: begin_time_ms },
                )
                .await
            }
            AsrEvent::Completed => {
                let ok = send_envelope(
                    socket,
                    task_id,
                    Namespace::SpeechTranscriber,
                    "TranscriptionCompleted",
                    Empty {},
                )
                .await;
                return ok && false; // terminal: caller should stop the loop either way
            }
        };
        if !ok {
            return false;
        }
    }
    true
}

async fn send_envelope<P: serde::Serialize>(
    socket: &mut WebSocket,
    task_id: &TaskId,
    namespace: Namespace,
    name: &str,
    payload: P,
) -> bool {
    let header = Header::success(task_id, namespace, name);
    let envelope = Envelope::new(header, payload);
    let Ok(text) = serde_json::to_string(&envelope) else { return false };
    socket.send(Message::Text(text.into())).await.is_ok()
}

async fn send_task_failed(socket: &mut WebSocket, task_id: &TaskId, status_text: &str) {
    let header = Header::failed(task_id, Namespace::SpeechTranscriber, status::DEFAULT_CLIENT_ERROR, status_text);
    let envelope = Envelope::new(header, Empty {});
    if let Ok(text) = serde_json::to_string(&envelope) {
        let _ = socket.send(Message::Text(text.into())).await;
    }
}
