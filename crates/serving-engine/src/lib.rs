#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

pub mod device;
pub mod engine;
pub mod error;
pub mod executor;
pub mod nearfield;
pub mod pcm;
pub mod pool;
pub mod text;

pub use device::{Device, parse_device_spec};
pub use engine::{EngineReplica, StubEngine};
pub use error::EngineError;
pub use executor::InferenceExecutor;
pub use nearfield::{GateOutcome, gate, rms};
pub use pcm::{decode_pcm16le, encode_pcm16le, wrap_wav};
pub use pool::{EnginePool, ReplicaGuard};
pub use text::{apply_itn, build_clone_prompt, restore_punctuation, split_sentences};
