#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod mask;
pub mod ports;
pub mod protocol;
pub mod settings;

pub use domain::{
    AsrAccumulator, AsrParams, AsyncTtsTask, AsyncTtsTaskStatus, MessageId, Session, SessionState,
    SynthesisKind, TaskId, TtsFormat, TtsParams, TtsSentenceTiming,
};
pub use error::CoreError;
pub use ports::{
    AsyncTaskStorePort, CloneTts, EngineHealth, FileAsr, PresetTts, StreamingAsr, TranscribeResult,
};
pub use protocol::{Envelope, Header, status};
pub use settings::Settings;

#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
