//! Client → server wire shapes (§6.1).
//!
//! The outer envelope is parsed permissively — `payload` is left as a raw
//! [`serde_json::Value`] because its shape depends on `header.name` — then the matching
//! per-message payload struct is deserialized from it on demand.

use serde::Deserialize;

/// `{header, payload}` as received from the client. Mirrors [`serving_core::Envelope`]
/// but keeps `payload` untyped until the message name is known.
#[derive(Debug, Deserialize)]
pub struct ClientEnvelope {
    pub header: ClientHeader,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ClientHeader {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub appkey: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct StartTranscriptionPayload {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub enable_intermediate_result: Option<bool>,
    #[serde(default)]
    pub enable_punctuation_prediction: Option<bool>,
    #[serde(default)]
    pub enable_inverse_text_normalization: Option<bool>,
    #[serde(default)]
    pub max_sentence_silence: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct StartSynthesisPayload {
    pub voice: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub volume: Option<u8>,
    #[serde(default)]
    pub speech_rate: Option<i32>,
    #[serde(default)]
    pub pitch_rate: Option<i32>,
    #[serde(default)]
    pub enable_subtitle: Option<bool>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunSynthesisPayload {
    pub text: String,
}
