//! JSON bodies for the one-shot and async HTTP endpoints (§4.5, §4.6).

use serde::{Deserialize, Serialize};

use serving_core::domain::TtsSentenceTiming;

#[derive(Debug, Serialize)]
pub struct FileAsrResponse {
    pub task_id: String,
    pub result: String,
    pub status: u32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FileTtsRequest {
    pub text: String,
    pub voice: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub speech_rate: Option<i32>,
    #[serde(default)]
    pub volume: Option<u8>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub appkey: Option<String>,
}

/// OpenAI-compatible `/openai/v1/audio/speech` body.
#[derive(Debug, Deserialize)]
pub struct OpenAiSpeechRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub input: String,
    pub voice: String,
    #[serde(default)]
    pub response_format: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub replicas: Vec<ReplicaHealth>,
}

#[derive(Debug, Serialize)]
pub struct ReplicaHealth {
    pub device: String,
    pub loaded: bool,
    pub file_asr_loaded: bool,
    pub streaming_asr_loaded: bool,
    pub preset_tts_loaded: bool,
    pub clone_tts_loaded: bool,
    pub loaded_models: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceListResponse {
    pub preset_voices: Vec<String>,
    pub clone_voices: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceRefreshResponse {
    pub preset_voice_count: usize,
    pub clone_voice_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AsyncTtsSubmitHeader {
    #[serde(default)]
    pub appkey: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AsyncTtsSubmitPayload {
    pub text: String,
    pub voice: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub enable_subtitle: Option<bool>,
    #[serde(default)]
    pub enable_notify: Option<bool>,
    #[serde(default)]
    pub notify_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AsyncTtsSubmitRequest {
    pub header: AsyncTtsSubmitHeader,
    pub payload: AsyncTtsSubmitPayload,
}

#[derive(Debug, Serialize)]
pub struct AsyncTtsSubmitData {
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub struct AsyncTtsSubmitResponse {
    pub status: u16,
    pub error_code: u32,
    pub error_message: String,
    pub request_id: String,
    pub data: AsyncTtsSubmitData,
}

#[derive(Debug, Deserialize)]
pub struct AsyncTtsQueryParams {
    #[serde(default)]
    pub appkey: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub struct AsyncTtsQueryResponse {
    pub status: u16,
    pub error_code: u32,
    pub error_message: String,
    pub task_id: String,
    pub audio_address: Option<String>,
    pub sentences: Vec<TtsSentenceTiming>,
    pub notify_custom: Option<String>,
}
