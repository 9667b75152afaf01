//! Server → client wire payloads, carried inside [`serving_core::Envelope`] (§4.3, §4.4).

use serde::Serialize;

/// Empty payload for events that carry no fields beyond the header
/// (`TranscriptionCompleted`, `SynthesisCompleted`, `TaskFailed`).
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionStartedPayload {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceBeginPayload {
    pub index: u32,
    pub time: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResultChangedPayload {
    pub index: u32,
    pub time: u64,
    pub result: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceEndPayload {
    pub index: u32,
    pub time: u64,
    pub result: String,
    pub begin_time: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynthesisStartedPayload {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtsSentenceBeginPayload {
    pub index: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceSynthesisPayload {
    pub index: u32,
    pub bytes_sent: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtsSentenceEndPayload {
    pub index: u32,
}
