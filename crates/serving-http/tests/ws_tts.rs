//! Integration tests for the flowing speech synthesis WebSocket (§4.4, §6.2 `/ws/v1/tts`).

mod common;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

enum Frame {
    Json(serde_json::Value),
    Binary(Vec<u8>),
}

async fn recv_frame(
    ws: &mut tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
) -> Frame {
    loop {
        match ws.next().await.expect("stream ended early").expect("ws error") {
            Message::Text(text) => return Frame::Json(serde_json::from_str(&text).unwrap()),
            Message::Binary(bytes) => return Frame::Binary(bytes.to_vec()),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

#[tokio::test]
async fn start_run_stop_synthesis_round_trip() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let (base, _server) = common::spawn_test_server(ctx).await;

    let (mut ws, _) = connect_async(format!("{base}/ws/v1/tts")).await.unwrap();

    let start = json!({
        "header": {"message_id": "m1", "task_id": "t1", "name": "StartSynthesis"},
        "payload": {"voice": "中文女", "format": "PCM", "sample_rate": 16000}
    });
    ws.send(Message::Text(start.to_string().into())).await.unwrap();

    match recv_frame(&mut ws).await {
        Frame::Json(v) => {
            assert_eq!(v["header"]["name"], "SynthesisStarted");
            assert!(v["payload"]["session_id"].as_str().unwrap().starts_with("session_"));
        }
        Frame::Binary(_) => panic!("expected SynthesisStarted json frame"),
    }

    let run = json!({
        "header": {"message_id": "m2", "task_id": "t1", "name": "RunSynthesis"},
        "payload": {"text": "你好，世界。"}
    });
    ws.send(Message::Text(run.to_string().into())).await.unwrap();

    let mut saw_sentence_begin = false;
    let mut saw_audio = false;
    let mut saw_sentence_end = false;
    for _ in 0..64 {
        match recv_frame(&mut ws).await {
            Frame::Json(v) if v["header"]["name"] == "TtsSentenceBegin" => saw_sentence_begin = true,
            Frame::Json(v) if v["header"]["name"] == "TtsSentenceEnd" => {
                saw_sentence_end = true;
                break;
            }
            Frame::Binary(bytes) => {
                assert!(!bytes.is_empty());
                saw_audio = true;
            }
            _ => {}
        }
    }
    assert!(saw_sentence_begin && saw_audio && saw_sentence_end);

    let stop = json!({
        "header": {"message_id": "m3", "task_id": "t1", "name": "StopSynthesis"},
        "payload": {}
    });
    ws.send(Message::Text(stop.to_string().into())).await.unwrap();

    match recv_frame(&mut ws).await {
        Frame::Json(v) => assert_eq!(v["header"]["name"], "SynthesisCompleted"),
        Frame::Binary(_) => panic!("expected SynthesisCompleted json frame"),
    }
}

#[tokio::test]
async fn start_synthesis_rejects_unknown_voice_on_first_run() {
    let ctx = common::test_context(common::settings_no_auth()).await;
    let (base, _server) = common::spawn_test_server(ctx).await;

    let (mut ws, _) = connect_async(format!("{base}/ws/v1/tts")).await.unwrap();

    let start = json!({
        "header": {"message_id": "m1", "task_id": "t1", "name": "StartSynthesis"},
        "payload": {"voice": "不存在的声音"}
    });
    ws.send(Message::Text(start.to_string().into())).await.unwrap();
    match recv_frame(&mut ws).await {
        Frame::Json(v) => assert_eq!(v["header"]["name"], "SynthesisStarted"),
        Frame::Binary(_) => panic!("expected SynthesisStarted json frame"),
    }

    let run = json!({
        "header": {"message_id": "m2", "task_id": "t1", "name": "RunSynthesis"},
        "payload": {"text": "你好"}
    });
    ws.send(Message::Text(run.to_string().into())).await.unwrap();

    match recv_frame(&mut ws).await {
        Frame::Json(v) => assert_eq!(v["header"]["name"], "TaskFailed"),
        Frame::Binary(_) => panic!("expected TaskFailed json frame"),
    }
}
