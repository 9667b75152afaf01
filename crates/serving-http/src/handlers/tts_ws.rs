//! `GET /ws/v1/tts` — flowing speech synthesis WebSocket handler (§4.4, §6.2).

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use serving_core::domain::{TaskId, TtsFormat, TtsParams};
use serving_core::protocol::{Envelope, Header, Namespace};
use serving_core::status;

use crate::auth::validate_nls_token;
use crate::dto::egress::{
    Empty, SentenceSynthesisPayload, SynthesisStartedPayload, TtsSentenceBeginPayload, TtsSentenceEndPayload,
};
use crate::dto::ingress::{ClientEnvelope, RunSynthesisPayload, StartSynthesisPayload};
use crate::state::AppState;
use crate::tts_session::{TtsEvent, TtsSession};

pub async fn tts_ws_handler(State(state): State<AppState>, headers: HeaderMap, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, headers))
}

fn parse_format(raw: Option<&str>) -> TtsFormat {
    match raw.map(str::to_ascii_uppercase).as_deref() {
        Some("WAV") => TtsFormat::Wav,
        Some("MP3") => TtsFormat::Mp3,
        _ => TtsFormat::Pcm,
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState, headers: HeaderMap) {
    let task_id = TaskId::new();

    if let Err(err) = validate_nls_token(&state.settings, &headers) {
        send_task_failed(&mut socket, &task_id, &err.status_text()).await;
        return;
    }

    let mut engine_index: Option<usize> = None;
    let mut session: Option<TtsSession> = None;

    loop {
        let Some(msg) = socket.recv().await else { break };
        let msg = match msg {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(%task_id, error = %err, "TTS WS recv error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                if !handle_control(&text, &mut socket, &state, &task_id, &mut engine_index, &mut session).await {
                    break;
                }
            }
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    if let Some(idx) = engine_index {
        state.pool.release(idx);
    }
}

async fn handle_control(
    text: &str,
    socket: &mut WebSocket,
    state: &AppState,
    task_id: &TaskId,
    engine_index: &mut Option<usize>,
    session: &mut Option<TtsSession>,
) -> bool {
    let envelope: ClientEnvelope = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => {
            send_task_failed(socket, task_id, &format!("invalid message: {err}")).await;
            return false;
        }
    };

    match envelope.header.name.as_str() {
        "StartSynthesis" if session.is_none() => {
            let payload: StartSynthesisPayload = match serde_json::from_value(envelope.payload) {
                Ok(p) => p,
                Err(err) => {
                    send_task_failed(socket, task_id, &format!("invalid StartSynthesis payload: {err}")).await;
                    return false;
                }
            };
            let format = parse_format(payload.format.as_deref());
            let sample_rate = payload.sample_rate.unwrap_or(16_000);
            if !format.is_supported_sample_rate(sample_rate) {
                send_task_failed(socket, task_id, &format!("unsupported sample rate: {sample_rate}")).await;
                return false;
            }
            let params = TtsParams {
                voice: payload.voice,
                format,
                sample_rate,
                speech_rate: payload.speech_rate.unwrap_or(0),
                volume: payload.volume.unwrap_or(50),
                prompt: payload.prompt,
                enable_subtitle: payload.enable_subtitle.unwrap_or(false),
            };

            let index = state.pool.select();
            *engine_index = Some(index);
            let session_id = format!("session_{task_id}");
            *session = Some(TtsSession::new(
                task_id.clone(),
                session_id.clone(),
                params,
                index,
                state.settings.clone_model_version,
            ));

            send_envelope(
                socket,
                task_id,
                Namespace::FlowingSpeechSynthesizer,
                "SynthesisStarted",
                SynthesisStartedPayload { session_id },
            )
            .await
        }
        "RunSynthesis" if session.is_some() => {
            let payload: RunSynthesisPayload = match serde_json::from_value(envelope.payload) {
                Ok(p) => p,
                Err(err) => {
                    send_task_failed(socket, task_id, &format!("invalid RunSynthesis payload: {err}")).await;
                    return false;
                }
            };
            let active = session.as_mut().expect("checked Some above");
            match active.run_synthesis(&payload.text, &state.pool, &state.executor).await {
                Ok(events) => send_events(socket, task_id, events).await,
                Err(err) => {
                    send_task_failed(socket, task_id, &err.status_text()).await;
                    false
                }
            }
        }
        "StopSynthesis" if session.is_some() => {
            send_envelope(socket, task_id, Namespace::FlowingSpeechSynthesizer, "SynthesisCompleted", Empty {}).await;
            false
        }
        other => {
            send_task_failed(socket, task_id, &format!("unexpected message in current state: {other}")).await;
            false
        }
    }
}

async fn send_events(socket: &mut WebSocket, task_id: &TaskId, events: Vec<TtsEvent>) -> bool {
    for event in events {
        let ok = match event {
            TtsEvent::SentenceBegin { index } => {
                send_envelope(
                    socket,
                    task_id,
                    Namespace::FlowingSpeechSynthesizer,
                    "TtsSentenceBegin",
                    TtsSentenceBeginPayload { index },
                )
                .await
            }
            TtsEvent::AudioChunk { bytes } => socket.send(Message::Binary(bytes.into())).await.is_ok(),
            TtsEvent::SentenceSynthesis { index, bytes_sent } => {
                send_envelope(
                    socket,
                    task_id,
                    Namespace::FlowingSpeechSynthesizer,
                    "SentenceSynthesis",
                    SentenceSynthesisPayload { index, bytes_sent },
                )
                .await
            }
            TtsEvent::SentenceEnd { index } => {
                send_envelope(
                    socket,
                    task_id,
                    Namespace::FlowingSpeechSynthesizer,
                    "TtsSentenceEnd",
                    TtsSentenceEndPayload { index },
                )
                .await
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
    let header =
        Header::failed(task_id, Namespace::FlowingSpeechSynthesizer, status::DEFAULT_CLIENT_ERROR, status_text);
    let envelope = Envelope::new(header, Empty {});
    if let Ok(text) = serde_json::to_string(&envelope) {
        let _ = socket.send(Message::Text(text.into())).await;
    }
}
