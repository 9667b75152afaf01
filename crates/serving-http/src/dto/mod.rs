//! Wire-facing DTOs, kept distinct from the domain types in `serving_core::domain`
//! so the wire format can evolve independently of internal session state.

pub mod egress;
pub mod http;
pub mod ingress;

pub use egress::{
    Empty, SentenceBeginPayload, SentenceEndPayload, SentenceSynthesisPayload,
    SynthesisStartedPayload, TranscriptionResultChangedPayload, TranscriptionStartedPayload,
    TtsSentenceBeginPayload, TtsSentenceEndPayload,
};
pub use http::{
    AsyncTtsQueryParams, AsyncTtsQueryResponse, AsyncTtsSubmitRequest, AsyncTtsSubmitResponse,
    FileAsrResponse, FileTtsRequest, HealthResponse, OpenAiSpeechRequest, VoiceListResponse,
    VoiceRefreshResponse,
};
pub use ingress::{
    ClientEnvelope, ClientHeader, RunSynthesisPayload, StartSynthesisPayload,
    StartTranscriptionPayload,
};
