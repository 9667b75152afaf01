//! Engine-layer error type. Converted into [`serving_core::CoreError`] at the boundary
//! where the engine pool is consumed by the HTTP/WS layer.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no engine replica could be constructed for device spec {0:?}")]
    NoReplicasConstructed(String),

    #[error("engine replica does not support capability: {0}")]
    CapabilityNotSupported(String),

    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("executor shut down")]
    ExecutorShutDown,
}

impl From<EngineError> for serving_core::CoreError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::NoReplicasConstructed(msg) => Self::Internal(msg),
            EngineError::CapabilityNotSupported(cap) => Self::EngineNotLoaded(cap),
            EngineError::VoiceNotFound(voice) => {
                Self::InvalidParameter(format!("unknown voice: {voice}"))
            }
            EngineError::Inference(msg) => Self::InferenceFailure(msg),
            EngineError::ExecutorShutDown => {
                Self::InferenceFailure("executor shut down".to_string())
            }
        }
    }
}
