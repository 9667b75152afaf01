//! ASR streaming session state machine (§4.3) — the hardest subsystem in this repo.
//!
//! Drives chunk accretion, the nearfield gate, endpointing, result deduplication, and
//! the punctuation/ITN cascade for one `SpeechTranscriber` WebSocket session. The
//! handler owns the WS I/O; this module owns everything between "bytes arrived" and
//! "these events should be sent".

use serving_core::domain::{AsrAccumulator, AsrParams, TaskId};
use serving_core::settings::Settings;
use serving_engine::{EnginePool, GateOutcome, InferenceExecutor, decode_pcm16le, gate};
use serving_engine::{apply_itn, restore_punctuation};

use crate::error::HttpError;

/// One server-to-client event the handler must translate into a wire message.
#[derive(Debug, Clone)]
pub enum AsrEvent {
    SentenceBegin { index: u32, time_ms: u64 },
    ResultChanged { index: u32, time_ms: u64, result: String },
    SentenceEnd { index: u32, time_ms: u64, result: String, begin_time_ms: u64 },
    Completed,
}

/// Largest/smallest standard chunk sizes, generalized to `sample_rate` (§4.3: 9600/3840
/// samples at 16 kHz, i.e. 600 ms / 240 ms).
fn standard_chunk_sizes(sample_rate: u32) -> [usize; 2] {
    [(sample_rate as usize * 6) / 10, (sample_rate as usize * 24) / 100]
}

fn duration_ms(samples: usize, sample_rate: u32) -> u64 {
    (samples as u64 * 1000) / u64::from(sample_rate.max(1))
}

pub struct AsrSession {
    pub task_id: TaskId,
    pub session_id: String,
    pub params: AsrParams,
    pub engine_index: usize,
    buffer: Vec<f32>,
    accumulator: Option<AsrAccumulator>,
    sentence_index: u32,
    engine_cache: Vec<u8>,
    audio_time_ms: u64,
}

impl AsrSession {
    #[must_use]
    pub fn new(task_id: TaskId, session_id: String, params: AsrParams, engine_index: usize) -> Self {
        Self {
            task_id,
            session_id,
            params,
            engine_index,
            buffer: Vec::new(),
            accumulator: None,
            sentence_index: 0,
            engine_cache: Vec::new(),
            audio_time_ms: 0,
        }
    }

    /// Decodes a PCM16LE frame and appends it to the rolling buffer.
    pub fn push_audio(&mut self, frame: &[u8]) {
        self.buffer.extend(decode_pcm16le(frame));
    }

    /// Drains and processes every standard chunk the buffer currently has enough
    /// samples for, largest chunk first (§9 buffering policy).
    pub async fn drain_available_chunks(
        &mut self,
        pool: &EnginePool,
        settings: &Settings,
        executor: &InferenceExecutor,
    ) -> Result<Vec<AsrEvent>, HttpError> {
        let mut events = Vec::new();
        loop {
            let sizes = standard_chunk_sizes(self.params.sample_rate);
            let Some(&chunk_size) = sizes.iter().find(|&&sz| self.buffer.len() >= sz) else {
                break;
            };
            let chunk: Vec<f32> = self.buffer.drain(..chunk_size).collect();
            self.process_chunk(&chunk, false, pool, settings, executor, &mut events).await?;
        }
        Ok(events)
    }

    /// Flushes the remaining buffer with `is_final=true` (§4.3 Stop handling) and
    /// finalizes any still-active sentence.
    pub async fn stop(
        &mut self,
        pool: &EnginePool,
        settings: &Settings,
        executor: &InferenceExecutor,
    ) -> Result<Vec<AsrEvent>, HttpError> {
        let mut events = Vec::new();
        let remaining: Vec<f32> = self.buffer.drain(..).collect();
        self.process_chunk(&remaining, true, pool, settings, executor, &mut events).await?;

        if let Some(acc) = self.accumulator.take() {
            events.push(self.finalize_sentence(acc));
        }
        events.push(AsrEvent::Completed);
        Ok(events)
    }

    async fn process_chunk(
        &mut self,
        chunk: &[f32],
        is_final: bool,
        pool: &EnginePool,
        settings: &Settings,
        executor: &InferenceExecutor,
        events: &mut Vec<AsrEvent>,
    ) -> Result<(), HttpError> {
        self.audio_time_ms += duration_ms(chunk.len(), self.params.sample_rate);

        if !is_final && settings.asr_enable_nearfield_filter {
            let active = self.accumulator.as_ref().is_some_and(|a| a.active);
            match gate(chunk, settings.asr_nearfield_rms_threshold, active) {
                GateOutcome::DropSilently => return Ok(()),
                GateOutcome::TreatAsEmpty => {
                    self.apply_empty_result(events);
                    return Ok(());
                }
                GateOutcome::Submit => {}
            }
        }

        let asr = pool.streaming_asr(self.engine_index)?;
        let cache = &self.engine_cache;
        let sample_rate = self.params.sample_rate;
        let result = executor
            .run_async(|| asr.transcribe_streaming(chunk, cache, is_final, sample_rate))
            .await?;
        self.engine_cache = result.cache;

        if result.is_flush {
            if let Some(acc) = self.accumulator.take() {
                events.push(self.finalize_sentence(acc));
            }
            return Ok(());
        }

        if result.raw_text.is_empty() {
            self.apply_empty_result(events);
        } else {
            self.apply_nonempty_result(&result.raw_text, settings, events);
        }
        Ok(())
    }

    fn apply_empty_result(&mut self, events: &mut Vec<AsrEvent>) {
        let threshold = self.params.empty_chunk_endpoint_threshold();
        let Some(acc) = self.accumulator.as_mut() else { return };
        acc.empty_count += 1;
        if acc.empty_count >= threshold {
            let acc = self.accumulator.take().expect("checked Some above");
            events.push(self.finalize_sentence(acc));
        }
    }

    fn apply_nonempty_result(&mut self, raw: &str, settings: &Settings, events: &mut Vec<AsrEvent>) {
        if self.accumulator.is_none() {
            self.sentence_index += 1;
            self.accumulator = Some(AsrAccumulator::starting(self.sentence_index, self.audio_time_ms));
            events.push(AsrEvent::SentenceBegin {
                index: self.sentence_index,
                time_ms: self.audio_time_ms,
            });
        }

        let intermediate_punc = settings.asr_enable_realtime_punc && self.params.enable_punctuation_prediction;
        let display_candidate =
            if intermediate_punc { restore_punctuation(raw) } else { raw.to_string() };

        let acc = self.accumulator.as_mut().expect("just ensured Some");
        acc.empty_count = 0;
        AsrAccumulator::push_deduped(&mut acc.raw_texts, raw.to_string());
        if AsrAccumulator::push_deduped(&mut acc.texts, display_candidate) {
            acc.last_display = acc.display_text();
            events.push(AsrEvent::ResultChanged {
                index: acc.index,
                time_ms: self.audio_time_ms,
                result: acc.last_display.clone(),
            });
        }
    }

    fn finalize_sentence(&self, acc: AsrAccumulator) -> AsrEvent {
        let raw_concat = acc.raw_concat();
        let punctuated = restore_punctuation(&raw_concat);
        let result =
            if self.params.enable_inverse_text_normalization { apply_itn(&punctuated) } else { punctuated };
        AsrEvent::SentenceEnd {
            index: acc.index,
            time_ms: self.audio_time_ms,
            result,
            begin_time_ms: acc.begin_time_ms,
        }
    }
}
