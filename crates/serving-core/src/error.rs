use thiserror::Error;

/// Error taxonomy shared by the ASR/TTS serving core (§7 of the spec).
///
/// Every variant maps to exactly one wire status code (see [`crate::protocol::status`])
/// and to one HTTP status class (400 for client-origin, 500 for server-origin).
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("authentication failed")]
    Authentication,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported sample rate: {0}")]
    UnsupportedSampleRate(u32),

    #[error("audio too large: {0} bytes")]
    AudioTooLarge(usize),

    #[error("failed to download audio: {0}")]
    AudioDownloadFailed(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    #[error("engine not loaded for capability: {0}")]
    EngineNotLoaded(String),

    #[error("inference failed: {0}")]
    InferenceFailure(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wire/HTTP `status` code from the §6.4 taxonomy.
    #[must_use]
    pub const fn status_code(&self) -> u32 {
        match self {
            Self::Authentication => 40_000_001,
            Self::InvalidMessage(_) => 40_000_002,
            Self::InvalidParameter(_) | Self::AudioTooLarge(_) | Self::UnsupportedAudioFormat(_) => {
                40_000_003
            }
            Self::UnsupportedSampleRate(_) => 41_010_101,
            Self::AudioDownloadFailed(_) => 50_000_000,
            Self::EngineNotLoaded(_) => 50_000_001,
            Self::InferenceFailure(_) => 50_000_001,
            Self::TaskNotFound(_) => 40_000_000,
            Self::Internal(_) => 50_000_000,
        }
    }

    /// Whether this error originates from the client (→ HTTP 400) or the server (→ HTTP 500).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication
                | Self::InvalidMessage(_)
                | Self::InvalidParameter(_)
                | Self::UnsupportedSampleRate(_)
                | Self::AudioTooLarge(_)
                | Self::UnsupportedAudioFormat(_)
                | Self::TaskNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_sample_rate_maps_to_its_dedicated_code() {
        assert_eq!(CoreError::UnsupportedSampleRate(44_100).status_code(), 41_010_101);
    }

    #[test]
    fn inference_failure_is_server_origin() {
        let err = CoreError::InferenceFailure("boom".into());
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), 50_000_001);
    }
}
