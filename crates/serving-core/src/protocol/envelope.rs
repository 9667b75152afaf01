use serde::{Deserialize, Serialize};

use crate::domain::{MessageId, TaskId};

use super::status;

/// Envelope namespace, identifying which protocol a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Namespace {
    SpeechTranscriber,
    FlowingSpeechSynthesizer,
    Default,
}

/// Common header carried by every control message (§6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub message_id: MessageId,
    pub task_id: TaskId,
    pub namespace: Namespace,
    pub name: String,
    pub status: u32,
    pub status_text: String,
}

impl Header {
    #[must_use]
    pub fn success(task_id: &TaskId, namespace: Namespace, name: &str) -> Self {
        Self {
            message_id: MessageId::new(),
            task_id: task_id.clone(),
            namespace,
            name: name.to_string(),
            status: status::SUCCESS,
            status_text: "SUCCESS".to_string(),
        }
    }

    #[must_use]
    pub fn failed(task_id: &TaskId, namespace: Namespace, status_code: u32, status_text: &str) -> Self {
        Self {
            message_id: MessageId::new(),
            task_id: task_id.clone(),
            namespace,
            name: "TaskFailed".to_string(),
            status: status_code,
            status_text: status_text.to_string(),
        }
    }
}

/// `{header, payload}` envelope (§6.1). `payload` is left generic so each event carries
/// its own typed shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<P> {
    pub header: Header,
    pub payload: P,
}

impl<P> Envelope<P> {
    #[must_use]
    pub const fn new(header: Header, payload: P) -> Self {
        Self { header, payload }
    }
}
