mod stub;

pub use stub::StubEngine;

use std::sync::Arc;

use serving_core::{CloneTts, FileAsr, PresetTts, StreamingAsr};

use crate::device::Device;

/// One replica: the union of whichever capabilities the configured model modes call
/// for, bound to a specific device. The pool dispatches by requested capability; a
/// replica missing a capability simply has `None` in that slot.
pub struct EngineReplica {
    pub device: Device,
    pub file_asr: Option<Arc<dyn FileAsr>>,
    pub streaming_asr: Option<Arc<dyn StreamingAsr>>,
    pub preset_tts: Option<Arc<dyn PresetTts>>,
    pub clone_tts: Option<Arc<dyn CloneTts>>,
}

impl EngineReplica {
    #[must_use]
    pub fn health(&self) -> serving_core::EngineHealth {
        serving_core::EngineHealth {
            device: self.device.to_string(),
            file_asr_loaded: self.file_asr.is_some(),
            streaming_asr_loaded: self.streaming_asr.is_some(),
            preset_tts_loaded: self.preset_tts.is_some(),
            clone_tts_loaded: self.clone_tts.is_some(),
            loaded_models: self.loaded_model_names(),
        }
    }

    fn loaded_model_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.file_asr.is_some() {
            names.push("file_asr".to_string());
        }
        if self.streaming_asr.is_some() {
            names.push("streaming_asr".to_string());
        }
        if self.preset_tts.is_some() {
            names.push("preset_tts".to_string());
        }
        if self.clone_tts.is_some() {
            names.push("clone_tts".to_string());
        }
        names
    }
}
