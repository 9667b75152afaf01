use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::session::TtsFormat;

/// The one-way lattice an [`AsyncTtsTask`] travels through: `Running -> {Success, Failed}`.
/// Terminal states never revert; repository writes after a terminal state are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AsyncTtsTaskStatus {
    Running,
    Success,
    Failed,
}

impl AsyncTtsTaskStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// One `{text, beginTime, endTime}` entry produced by segmented synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSentenceTiming {
    pub text: String,
    pub begin_time_ms: u64,
    pub end_time_ms: u64,
}

/// A row of the `async_tts_tasks` table (§3, §6.6 of the spec).
#[derive(Debug, Clone)]
pub struct AsyncTtsTask {
    pub task_id: TaskId,
    pub request_id: String,
    pub status: AsyncTtsTaskStatus,
    pub text: String,
    pub voice: String,
    pub sample_rate: u32,
    pub format: TtsFormat,
    pub enable_subtitle: bool,
    pub enable_notify: bool,
    pub notify_url: Option<String>,
    pub audio_address: Option<String>,
    pub sentences: Vec<TtsSentenceTiming>,
    pub error_code: Option<u32>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AsyncTtsTask {
    /// Maximum text length accepted by submit (§6.5 `MAX_TEXT_LENGTH` default).
    pub const MAX_TEXT_LEN: usize = 5000;

    #[must_use]
    pub fn new_running(
        request_id: String,
        text: String,
        voice: String,
        sample_rate: u32,
        format: TtsFormat,
        enable_subtitle: bool,
        enable_notify: bool,
        notify_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            task_id: TaskId::new(),
            request_id,
            status: AsyncTtsTaskStatus::Running,
            text,
            voice,
            sample_rate,
            format,
            enable_subtitle,
            enable_notify,
            notify_url,
            audio_address: None,
            sentences: Vec::new(),
            error_code: None,
            error_message: Some("RUNNING".to_string()),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
