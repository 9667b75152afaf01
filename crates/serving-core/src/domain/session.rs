use serde::{Deserialize, Serialize};

use super::ids::TaskId;

/// A session's place in its protocol's state machine. Both ASR and TTS sessions share
/// the same three-state shape; only the ingress/egress message sets differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Started,
    Completed,
}

impl SessionState {
    /// Whether `next` is a legal forward transition from `self`. The state machine never
    /// goes backwards, so equality is never a valid transition either.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Ready, Self::Started) | (Self::Started, Self::Completed)
        )
    }
}

/// Parameters captured from `StartTranscription`, with defaults per the wire spec.
#[derive(Debug, Clone)]
pub struct AsrParams {
    pub sample_rate: u32,
    pub enable_intermediate_result: bool,
    pub enable_punctuation_prediction: bool,
    pub enable_inverse_text_normalization: bool,
    pub max_sentence_silence_ms: u32,
}

impl Default for AsrParams {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            enable_intermediate_result: true,
            enable_punctuation_prediction: true,
            enable_inverse_text_normalization: true,
            max_sentence_silence_ms: 800,
        }
    }
}

impl AsrParams {
    /// Only 8 kHz and 16 kHz are accepted; anything else is a validation error upstream.
    #[must_use]
    pub fn is_supported_sample_rate(rate: u32) -> bool {
        matches!(rate, 8_000 | 16_000)
    }

    /// `max(3, (max_sentence_silence_ms * 2) / 600)` consecutive empty chunks before a
    /// sentence is force-ended by the silence heuristic.
    #[must_use]
    pub fn empty_chunk_endpoint_threshold(&self) -> u32 {
        (self.max_sentence_silence_ms * 2 / 600).max(3)
    }
}

/// Accumulates partial/final results for one in-flight ASR sentence.
#[derive(Debug, Clone, Default)]
pub struct AsrAccumulator {
    pub index: u32,
    pub active: bool,
    pub begin_time_ms: u64,
    pub texts: Vec<String>,
    pub raw_texts: Vec<String>,
    pub empty_count: u32,
    pub last_display: String,
}

impl AsrAccumulator {
    #[must_use]
    pub fn starting(index: u32, begin_time_ms: u64) -> Self {
        Self {
            index,
            active: true,
            begin_time_ms,
            ..Self::default()
        }
    }

    /// Appends `text` only if it differs from the current tail, preserving the
    /// monotonic-growth / no-retraction invariant.
    pub fn push_deduped(list: &mut Vec<String>, text: String) -> bool {
        if list.last().is_some_and(|tail| tail == &text) || text.is_empty() {
            return false;
        }
        list.push(text);
        true
    }

    #[must_use]
    pub fn display_text(&self) -> String {
        self.texts.concat()
    }

    #[must_use]
    pub fn raw_concat(&self) -> String {
        self.raw_texts.concat()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TtsFormat {
    Pcm,
    Wav,
    Mp3,
}

impl TtsFormat {
    #[must_use]
    pub fn is_supported_sample_rate(self, rate: u32) -> bool {
        matches!(rate, 8_000 | 16_000 | 22_050 | 24_000 | 44_100 | 48_000)
    }
}

/// Whether a `RunSynthesis` call is routed to the preset or clone-voice engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisKind {
    Preset,
    Clone,
}

/// Parameters captured from `StartSynthesis`.
#[derive(Debug, Clone)]
pub struct TtsParams {
    pub voice: String,
    pub format: TtsFormat,
    pub sample_rate: u32,
    pub speech_rate: i32,
    pub volume: u8,
    pub prompt: Option<String>,
    pub enable_subtitle: bool,
}

impl Default for TtsParams {
    fn default() -> Self {
        Self {
            voice: String::new(),
            format: TtsFormat::Pcm,
            sample_rate: 16_000,
            speech_rate: 0,
            volume: 50,
            prompt: None,
            enable_subtitle: false,
        }
    }
}

/// Session state shared by both the ASR and TTS WebSocket handlers.
pub struct Session {
    pub task_id: TaskId,
    pub session_id: String,
    pub state: SessionState,
    pub engine_replica: Option<usize>,
}

impl Session {
    #[must_use]
    pub fn new(task_id: TaskId) -> Self {
        let session_id = format!("session_{task_id}");
        Self {
            task_id,
            session_id,
            state: SessionState::Ready,
            engine_replica: None,
        }
    }

    pub fn advance(&mut self, next: SessionState) -> bool {
        if self.state.can_advance_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transitions_are_forward_only() {
        assert!(SessionState::Ready.can_advance_to(SessionState::Started));
        assert!(SessionState::Started.can_advance_to(SessionState::Completed));
        assert!(!SessionState::Ready.can_advance_to(SessionState::Completed));
        assert!(!SessionState::Started.can_advance_to(SessionState::Ready));
        assert!(!SessionState::Ready.can_advance_to(SessionState::Ready));
    }

    #[test]
    fn dedup_skips_repeated_and_empty_tails() {
        let mut texts = Vec::new();
        assert!(AsrAccumulator::push_deduped(&mut texts, "打开".into()));
        assert!(!AsrAccumulator::push_deduped(&mut texts, "打开".into()));
        assert!(!AsrAccumulator::push_deduped(&mut texts, String::new()));
        assert!(AsrAccumulator::push_deduped(&mut texts, "打开空调".into()));
        assert_eq!(texts, vec!["打开".to_string(), "打开空调".to_string()]);
    }

    #[test]
    fn empty_chunk_threshold_has_a_floor_of_three() {
        let mut params = AsrParams { max_sentence_silence_ms: 100, ..AsrParams::default() };
        assert_eq!(params.empty_chunk_endpoint_threshold(), 3);
        params.max_sentence_silence_ms = 1200;
        assert_eq!(params.empty_chunk_endpoint_threshold(), 4);
    }

    #[test]
    fn session_id_is_prefixed_task_id() {
        let session = Session::new(TaskId::from("abc123".to_string()));
        assert_eq!(session.session_id, "session_abc123");
    }
}
