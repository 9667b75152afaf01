//! TTS streaming session state machine (§4.4) — multi-turn `RunSynthesis` within one
//! `FlowingSpeechSynthesizer` session.

use serving_core::domain::{TaskId, TtsFormat, TtsParams};
use serving_core::settings::CloneModelVersion;
use serving_engine::{EnginePool, InferenceExecutor, build_clone_prompt, encode_pcm16le, wrap_wav};

use crate::error::HttpError;

/// One server-to-client event produced by a `RunSynthesis` call.
#[derive(Debug)]
pub enum TtsEvent {
    SentenceBegin { index: u32 },
    AudioChunk { bytes: Vec<u8> },
    SentenceSynthesis { index: u32, bytes_sent: usize },
    SentenceEnd { index: u32 },
}

/// `speech_rate` in `[-500, 500]` maps onto a multiplicative speed factor, 1.0 at 0.
fn speed_factor(speech_rate: i32) -> f32 {
    (1.0 + f32::from(speech_rate.clamp(-500, 500)) / 500.0).max(0.1)
}

pub struct TtsSession {
    pub task_id: TaskId,
    pub session_id: String,
    pub params: TtsParams,
    pub engine_index: usize,
    clone_model_version: CloneModelVersion,
    sentence_index: u32,
}

impl TtsSession {
    #[must_use]
    pub fn new(
        task_id: TaskId,
        session_id: String,
        params: TtsParams,
        engine_index: usize,
        clone_model_version: CloneModelVersion,
    ) -> Self {
        Self { task_id, session_id, params, engine_index, clone_model_version, sentence_index: 0 }
    }

    /// Runs one `RunSynthesis` call end to end: routes by voice (clone-voice registry
    /// takes priority, per §4.4 step 2), drives the engine's finite chunk list, and
    /// frames each chunk as PCM or WAV bytes.
    pub async fn run_synthesis(
        &mut self,
        text: &str,
        pool: &EnginePool,
        executor: &InferenceExecutor,
    ) -> Result<Vec<TtsEvent>, HttpError> {
        self.sentence_index += 1;
        let index = self.sentence_index;
        let mut events = vec![TtsEvent::SentenceBegin { index }];

        let chunks = self.synthesize(text, pool, executor).await?;

        let mut bytes_sent = 0usize;
        for chunk in chunks {
            let pcm_bytes = encode_pcm16le(&chunk);
            let framed = if self.params.format == TtsFormat::Pcm {
                pcm_bytes
            } else {
                wrap_wav(&pcm_bytes, self.params.sample_rate)
            };
            bytes_sent += framed.len();
            events.push(TtsEvent::AudioChunk { bytes: framed });
            events.push(TtsEvent::SentenceSynthesis { index, bytes_sent });
            tokio::task::yield_now().await;
        }

        events.push(TtsEvent::SentenceEnd { index });
        Ok(events)
    }

    async fn synthesize(
        &self,
        text: &str,
        pool: &EnginePool,
        executor: &InferenceExecutor,
    ) -> Result<Vec<Vec<f32>>, HttpError> {
        let speed = speed_factor(self.params.speech_rate);
        let voice = self.params.voice.as_str();

        let routed_to_clone = pool
            .clone_tts(self.engine_index)
            .ok()
            .is_some_and(|clone| clone.has_voice(voice));

        if routed_to_clone {
            let clone = pool.clone_tts(self.engine_index)?;
            let prompt = build_clone_prompt(self.params.prompt.as_deref(), self.clone_model_version);
            let chunks = executor
                .run_async(|| {
                    clone.synthesize_clone(
                        text,
                        voice,
                        speed,
                        self.params.sample_rate,
                        self.params.volume,
                        prompt.as_deref(),
                        self.params.format,
                    )
                })
                .await?;
            return Ok(chunks);
        }

        let preset = pool.preset_tts(self.engine_index)?;
        if !preset.has_voice(voice) {
            return Err(serving_core::CoreError::InvalidParameter(format!("unknown voice: {voice}")).into());
        }
        let chunks = executor
            .run_async(|| {
                preset.synthesize_preset(
                    text,
                    voice,
                    speed,
                    self.params.sample_rate,
                    self.params.volume,
                    self.params.format,
                )
            })
            .await?;
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serving_engine::{Device, EngineReplica, InferenceExecutor, StubEngine};
    use std::sync::Arc;

    fn executor() -> InferenceExecutor {
        InferenceExecutor::new(4)
    }

    fn pool() -> EnginePool {
        EnginePool::new(vec![EngineReplica {
            device: Device::Cpu,
            file_asr: Some(Arc::new(StubEngine::new())),
            streaming_asr: Some(Arc::new(StubEngine::new())),
            preset_tts: Some(Arc::new(StubEngine::new())),
            clone_tts: Some(Arc::new(StubEngine::new())),
        }])
        .unwrap()
    }

    fn params_for(voice: &str) -> TtsParams {
        TtsParams { voice: voice.to_string(), ..TtsParams::default() }
    }

    #[tokio::test]
    async fn preset_voice_produces_audio_chunks() {
        let pool = pool();
        let mut session = TtsSession::new(
            TaskId::new(),
            "session_x".to_string(),
            params_for("中文女"),
            0,
            CloneModelVersion::CosyVoice2,
        );
        let events = session.run_synthesis("你好。", &pool, &executor()).await.unwrap();
        assert!(matches!(events.first(), Some(TtsEvent::SentenceBegin { index: 1 })));
        assert!(events.iter().any(|e| matches!(e, TtsEvent::AudioChunk { .. })));
        assert!(matches!(events.last(), Some(TtsEvent::SentenceEnd { index: 1 })));
    }

    #[tokio::test]
    async fn clone_voice_takes_priority_over_preset() {
        let pool = pool();
        let mut session = TtsSession::new(
            TaskId::new(),
            "session_x".to_string(),
            params_for("demo"),
            0,
            CloneModelVersion::CosyVoice2,
        );
        let events = session.run_synthesis("请坐下。", &pool, &executor()).await.unwrap();
        assert!(events.iter().any(|e| matches!(e, TtsEvent::AudioChunk { .. })));
    }

    #[tokio::test]
    async fn unknown_voice_is_a_fatal_error() {
        let pool = pool();
        let mut session = TtsSession::new(
            TaskId::new(),
            "session_x".to_string(),
            params_for("does-not-exist"),
            0,
            CloneModelVersion::CosyVoice2,
        );
        assert!(session.run_synthesis("你好。", &pool, &executor()).await.is_err());
    }

    #[tokio::test]
    async fn a_second_run_synthesis_increments_the_sentence_index() {
        let pool = pool();
        let mut session = TtsSession::new(
            TaskId::new(),
            "session_x".to_string(),
            params_for("中文女"),
            0,
            CloneModelVersion::CosyVoice2,
        );
        session.run_synthesis("你好。", &pool, &executor()).await.unwrap();
        let events = session.run_synthesis("再见。", &pool, &executor()).await.unwrap();
        assert!(matches!(events.first(), Some(TtsEvent::SentenceBegin { index: 2 })));
    }
}
