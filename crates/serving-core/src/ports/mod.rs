//! Trait objects at the seams between the serving core and its collaborators: one trait
//! per engine capability (§4.2), plus the async task store port (§4.6). No engine-specific
//! or storage-specific types leak into these signatures.

mod engine;
mod task_store;

pub use engine::{
    CloneTts, EngineHealth, FileAsr, PresetTts, StreamingAsr, TranscribeFileParams,
    TranscribeResult,
};
pub use task_store::AsyncTaskStorePort;
