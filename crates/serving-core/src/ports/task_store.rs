use async_trait::async_trait;

use crate::domain::{AsyncTtsTask, AsyncTtsTaskStatus, TaskId, TtsSentenceTiming};
use crate::error::CoreError;

/// Storage port for [`AsyncTtsTask`] rows (§4.6, §6.6). No `sqlx` types appear in this
/// signature, mirroring the teacher's rule that ports stay free of adapter-specific types.
#[async_trait]
pub trait AsyncTaskStorePort: Send + Sync {
    async fn insert(&self, task: &AsyncTtsTask) -> Result<(), CoreError>;

    async fn find(&self, task_id: &TaskId) -> Result<Option<AsyncTtsTask>, CoreError>;

    /// Up to `limit` `RUNNING` tasks, ordered by `created_at ASC`.
    async fn poll_running(&self, limit: u32) -> Result<Vec<AsyncTtsTask>, CoreError>;

    /// Moves a task to a terminal state. Rejected (returns `Ok(false)`) if the task is
    /// already terminal, preserving the one-way lattice invariant.
    async fn complete(
        &self,
        task_id: &TaskId,
        status: AsyncTtsTaskStatus,
        audio_address: Option<String>,
        sentences: Vec<TtsSentenceTiming>,
        error_code: Option<u32>,
        error_message: Option<String>,
    ) -> Result<bool, CoreError>;

    /// Deletes terminal rows older than `older_than_days`.
    async fn reap(&self, older_than_days: i64) -> Result<u64, CoreError>;
}
