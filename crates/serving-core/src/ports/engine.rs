//! Capability traits an engine replica may implement (§4.2).
//!
//! Modeled the way the voice backend traits in the teacher crate split STT/TTS: one
//! trait per capability, `Send + Sync` so the pool can hold them behind `Arc` across
//! `.await` points, `#[async_trait]` wherever the call performs inference.

use async_trait::async_trait;

use crate::domain::TtsFormat;
use crate::error::CoreError;

/// Result of a streaming ASR call: the raw (un-punctuated) text, the punctuated text if
/// realtime punctuation ran, and the opaque cache to pass into the next call.
#[derive(Debug, Clone, Default)]
pub struct TranscribeResult {
    pub raw_text: String,
    pub punctuated_text: Option<String>,
    pub cache: Vec<u8>,
    /// True when the model signalled end-of-utterance on an `is_final` call.
    pub is_flush: bool,
}

/// Parameters for a one-shot file transcription call.
#[derive(Debug, Clone, Default)]
pub struct TranscribeFileParams {
    pub hotwords: Vec<String>,
    pub enable_punct: bool,
    pub enable_itn: bool,
    pub enable_vad: bool,
    pub sample_rate: u32,
    pub lang_tag: Option<String>,
    pub region_tag: Option<String>,
}

/// One-shot file transcription.
#[async_trait]
pub trait FileAsr: Send + Sync {
    async fn transcribe_file(
        &self,
        audio: &[f32],
        params: &TranscribeFileParams,
    ) -> Result<String, CoreError>;
}

/// Streaming chunk-at-a-time transcription, driven by the ASR session FSM.
#[async_trait]
pub trait StreamingAsr: Send + Sync {
    async fn transcribe_streaming(
        &self,
        pcm_chunk: &[f32],
        cache: &[u8],
        is_final: bool,
        sample_rate: u32,
    ) -> Result<TranscribeResult, CoreError>;
}

/// Preset-voice synthesis.
#[async_trait]
pub trait PresetTts: Send + Sync {
    /// Synthesizes `text` and yields PCM f32 chunks at `sample_rate`, applying `speed`
    /// and `volume`. The `format`/`sample_rate` arguments only affect framing downstream;
    /// the engine always produces raw float samples.
    async fn synthesize_preset(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        sample_rate: u32,
        volume: u8,
        format: TtsFormat,
    ) -> Result<Vec<Vec<f32>>, CoreError>;

    /// Whether `voice` is a known preset voice name.
    fn has_voice(&self, voice: &str) -> bool;

    /// Catalog of known preset voice names, for the voice-listing endpoints (§4.5).
    fn known_voices(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Zero-shot clone-voice synthesis.
#[async_trait]
pub trait CloneTts: Send + Sync {
    async fn synthesize_clone(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        sample_rate: u32,
        volume: u8,
        prompt: Option<&str>,
        format: TtsFormat,
    ) -> Result<Vec<Vec<f32>>, CoreError>;

    /// Whether `voice` is a registered clone voice name.
    fn has_voice(&self, voice: &str) -> bool;

    /// Catalog of known clone voice names, for the voice-listing endpoints (§4.5).
    fn known_voices(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Liveness/loaded-model snapshot for a replica (used by health endpoints, §4.5).
#[derive(Debug, Clone, Default)]
pub struct EngineHealth {
    pub device: String,
    pub file_asr_loaded: bool,
    pub streaming_asr_loaded: bool,
    pub preset_tts_loaded: bool,
    pub clone_tts_loaded: bool,
    pub loaded_models: Vec<String>,
}

impl EngineHealth {
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.file_asr_loaded || self.streaming_asr_loaded || self.preset_tts_loaded || self.clone_tts_loaded
    }
}
