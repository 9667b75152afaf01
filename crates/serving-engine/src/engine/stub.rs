//! Deterministic stand-in engine implementing the four capability traits (§4.2).
//!
//! Real ASR/TTS model wrappers are out of scope (§1 of the spec) — this crate exercises
//! the orchestration layer end-to-end against a fixed, reproducible engine instead of a
//! GPU-resident model. It plays the same role the teacher crate's backend modules play
//! for its voice pipeline, just without the FFI bindings.

use async_trait::async_trait;

use serving_core::{CloneTts, FileAsr, PresetTts, StreamingAsr, TranscribeFileParams, TranscribeResult};
use serving_core::error::CoreError;
use serving_core::domain::TtsFormat;

use crate::nearfield::rms;

/// Preset voice names this stub recognizes, matching the catalog shape of the teacher's
/// Kokoro voice table.
const PRESET_VOICES: &[&str] = &["中文女", "中文男", "英文女", "英文男"];
const CLONE_VOICES: &[&str] = &["demo"];

/// RMS floor below which a chunk is treated as silence by the stub model itself (distinct
/// from the session-level nearfield gate, which runs before the engine is ever called).
const SILENCE_FLOOR: f32 = 1e-4;

#[derive(Debug, Default)]
pub struct StubEngine;

impl StubEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn synth_samples(text: &str, sample_rate: u32, speed: f32, volume: u8) -> Vec<Vec<f32>> {
        let char_count = text.chars().count().max(1);
        let total_samples = ((sample_rate as usize / 10).max(1) * char_count / (speed.max(0.1) as usize).max(1))
            .clamp(sample_rate as usize / 20, sample_rate as usize * 4);
        let amplitude = f32::from(volume) / 100.0;

        let chunk_count = 2.min(total_samples.max(1));
        let per_chunk = total_samples / chunk_count.max(1);

        (0..chunk_count)
            .map(|chunk_idx| {
                (0..per_chunk)
                    .map(|i| {
                        let t = (chunk_idx * per_chunk + i) as f32 / sample_rate as f32;
                        amplitude * 0.2 * (t * 220.0 * std::f32::consts::TAU).sin()
                    })
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl FileAsr for StubEngine {
    async fn transcribe_file(
        &self,
        audio: &[f32],
        _params: &TranscribeFileParams,
    ) -> Result<String, CoreError> {
        if audio.is_empty() || rms(audio) < SILENCE_FLOOR {
            return Ok(String::new());
        }
        Ok(format!("[transcribed {} samples]", audio.len()))
    }
}

#[async_trait]
impl StreamingAsr for StubEngine {
    async fn transcribe_streaming(
        &self,
        pcm_chunk: &[f32],
        cache: &[u8],
        is_final: bool,
        _sample_rate: u32,
    ) -> Result<TranscribeResult, CoreError> {
        let counter = cache
            .first_chunk::<4>()
            .map(|b| u32::from_le_bytes(*b))
            .unwrap_or(0);

        if is_final {
            return Ok(TranscribeResult {
                raw_text: String::new(),
                punctuated_text: None,
                cache: counter.to_le_bytes().to_vec(),
                is_flush: true,
            });
        }

        if pcm_chunk.is_empty() || rms(pcm_chunk) < SILENCE_FLOOR {
            return Ok(TranscribeResult {
                raw_text: String::new(),
                punctuated_text: None,
                cache: counter.to_le_bytes().to_vec(),
                is_flush: false,
            });
        }

        let next_counter = counter + 1;
        Ok(TranscribeResult {
            raw_text: format!("w{next_counter}"),
            punctuated_text: None,
            cache: next_counter.to_le_bytes().to_vec(),
            is_flush: false,
        })
    }
}

#[async_trait]
impl PresetTts for StubEngine {
    async fn synthesize_preset(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        sample_rate: u32,
        volume: u8,
        _format: TtsFormat,
    ) -> Result<Vec<Vec<f32>>, CoreError> {
        if !self.has_voice(voice) {
            return Err(CoreError::InvalidParameter(format!("unknown preset voice: {voice}")));
        }
        Ok(Self::synth_samples(text, sample_rate, speed, volume))
    }

    fn has_voice(&self, voice: &str) -> bool {
        PRESET_VOICES.contains(&voice)
    }

    fn known_voices(&self) -> Vec<String> {
        PRESET_VOICES.iter().map(|v| (*v).to_string()).collect()
    }
}

#[async_trait]
impl CloneTts for StubEngine {
    async fn synthesize_clone(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        sample_rate: u32,
        volume: u8,
        _prompt: Option<&str>,
        _format: TtsFormat,
    ) -> Result<Vec<Vec<f32>>, CoreError> {
        if !self.has_voice(voice) {
            return Err(CoreError::InvalidParameter(format!("unknown clone voice: {voice}")));
        }
        Ok(Self::synth_samples(text, sample_rate, speed, volume))
    }

    fn has_voice(&self, voice: &str) -> bool {
        CLONE_VOICES.contains(&voice)
    }

    fn known_voices(&self) -> Vec<String> {
        CLONE_VOICES.iter().map(|v| (*v).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_asr_is_silent_on_empty_audio() {
        let engine = StubEngine::new();
        let result = engine.transcribe_file(&[], &TranscribeFileParams::default()).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn streaming_asr_advances_counter_on_non_silent_chunks() {
        let engine = StubEngine::new();
        let loud = vec![0.2_f32; 160];
        let first = engine.transcribe_streaming(&loud, &[], false, 16_000).await.unwrap();
        assert_eq!(first.raw_text, "w1");
        let second = engine.transcribe_streaming(&loud, &first.cache, false, 16_000).await.unwrap();
        assert_eq!(second.raw_text, "w2");
    }

    #[tokio::test]
    async fn streaming_asr_final_call_flushes_without_text() {
        let engine = StubEngine::new();
        let result = engine.transcribe_streaming(&[], &[], true, 16_000).await.unwrap();
        assert!(result.is_flush);
        assert!(result.raw_text.is_empty());
    }

    #[tokio::test]
    async fn preset_tts_rejects_unknown_voice() {
        let engine = StubEngine::new();
        let result = engine.synthesize_preset("你好", "不存在", 1.0, 22_050, 50, TtsFormat::Pcm).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn preset_tts_produces_nonempty_audio_for_known_voice() {
        let engine = StubEngine::new();
        let chunks = engine
            .synthesize_preset("你好。", "中文女", 1.0, 22_050, 50, TtsFormat::Pcm)
            .await
            .unwrap();
        assert!(!chunks.is_empty());
        assert!(chunks.iter().any(|c| !c.is_empty()));
    }

    #[tokio::test]
    async fn clone_tts_accepts_registered_voice_with_prompt() {
        let engine = StubEngine::new();
        let chunks = engine
            .synthesize_clone("请坐下。", "demo", 1.0, 22_050, 50, Some("用温柔的语气"), TtsFormat::Pcm)
            .await
            .unwrap();
        assert!(!chunks.is_empty());
    }
}
