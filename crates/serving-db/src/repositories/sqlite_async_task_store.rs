//! `SQLite` implementation of [`AsyncTaskStorePort`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use serving_core::domain::{AsyncTtsTask, AsyncTtsTaskStatus, TaskId, TtsFormat, TtsSentenceTiming};
use serving_core::error::CoreError;
use serving_core::ports::AsyncTaskStorePort;

/// `SQLite` implementation of [`AsyncTaskStorePort`]. Persists async TTS task state so
/// status survives a process restart (§4.6, §6.6).
pub struct SqliteAsyncTaskStore {
    pool: SqlitePool,
}

impl SqliteAsyncTaskStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn status_to_str(status: AsyncTtsTaskStatus) -> &'static str {
    match status {
        AsyncTtsTaskStatus::Running => "RUNNING",
        AsyncTtsTaskStatus::Success => "SUCCESS",
        AsyncTtsTaskStatus::Failed => "FAILED",
    }
}

fn status_from_str(s: &str) -> AsyncTtsTaskStatus {
    match s {
        "SUCCESS" => AsyncTtsTaskStatus::Success,
        "FAILED" => AsyncTtsTaskStatus::Failed,
        _ => AsyncTtsTaskStatus::Running,
    }
}

fn format_to_str(format: TtsFormat) -> &'static str {
    match format {
        TtsFormat::Pcm => "PCM",
        TtsFormat::Wav => "WAV",
        TtsFormat::Mp3 => "MP3",
    }
}

fn format_from_str(s: &str) -> TtsFormat {
    match s {
        "WAV" => TtsFormat::Wav,
        "MP3" => TtsFormat::Mp3,
        _ => TtsFormat::Pcm,
    }
}

#[async_trait]
impl AsyncTaskStorePort for SqliteAsyncTaskStore {
    async fn insert(&self, task: &AsyncTtsTask) -> Result<(), CoreError> {
        let sentences_json = serde_json::to_string(&task.sentences).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO async_tts_tasks (
                task_id, request_id, status, text, voice, sample_rate, format,
                enable_subtitle, enable_notify, notify_url, audio_address, sentences,
                error_code, error_message, created_at, updated_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(task_id) DO UPDATE SET
                status = excluded.status,
                audio_address = excluded.audio_address,
                sentences = excluded.sentences,
                error_code = excluded.error_code,
                error_message = excluded.error_message,
                updated_at = excluded.updated_at,
                completed_at = excluded.completed_at
            "#,
        )
        .bind(task.task_id.as_str())
        .bind(&task.request_id)
        .bind(status_to_str(task.status))
        .bind(&task.text)
        .bind(&task.voice)
        .bind(task.sample_rate)
        .bind(format_to_str(task.format))
        .bind(task.enable_subtitle)
        .bind(task.enable_notify)
        .bind(&task.notify_url)
        .bind(&task.audio_address)
        .bind(sentences_json)
        .bind(task.error_code.map(|c| c as i64))
        .bind(&task.error_message)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?;

        Ok(())
    }

    async fn find(&self, task_id: &TaskId) -> Result<Option<AsyncTtsTask>, CoreError> {
        let row = sqlx::query(
            r#"
            SELECT task_id, request_id, status, text, voice, sample_rate, format,
                   enable_subtitle, enable_notify, notify_url, audio_address, sentences,
                   error_code, error_message, created_at, updated_at, completed_at
            FROM async_tts_tasks WHERE task_id = ?
            "#,
        )
        .bind(task_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?;

        row.map(|r| row_to_task(&r)).transpose()
    }

    async fn poll_running(&self, limit: u32) -> Result<Vec<AsyncTtsTask>, CoreError> {
        let rows = sqlx::query(
            r#"
            SELECT task_id, request_id, status, text, voice, sample_rate, format,
                   enable_subtitle, enable_notify, notify_url, audio_address, sentences,
                   error_code, error_message, created_at, updated_at, completed_at
            FROM async_tts_tasks
            WHERE status = 'RUNNING'
            ORDER BY created_at ASC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?;

        rows.iter().map(row_to_task).collect()
    }

    async fn complete(
        &self,
        task_id: &TaskId,
        status: AsyncTtsTaskStatus,
        audio_address: Option<String>,
        sentences: Vec<TtsSentenceTiming>,
        error_code: Option<u32>,
        error_message: Option<String>,
    ) -> Result<bool, CoreError> {
        let sentences_json = serde_json::to_string(&sentences).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            UPDATE async_tts_tasks SET
                status = ?, audio_address = ?, sentences = ?, error_code = ?,
                error_message = ?, updated_at = ?, completed_at = ?
            WHERE task_id = ? AND status = 'RUNNING'
            "#,
        )
        .bind(status_to_str(status))
        .bind(audio_address)
        .bind(sentences_json)
        .bind(error_code.map(|c| c as i64))
        .bind(error_message)
        .bind(Utc::now())
        .bind(Utc::now())
        .bind(task_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn reap(&self, older_than_days: i64) -> Result<u64, CoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM async_tts_tasks
            WHERE status != 'RUNNING'
            AND completed_at < datetime('now', ? || ' days')
            "#,
        )
        .bind(-older_than_days)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn row_to_task(row: &SqliteRow) -> Result<AsyncTtsTask, CoreError> {
    let map_err = |e: sqlx::Error| CoreError::Internal(format!("column read error: {e}"));

    let task_id: String = row.try_get("task_id").map_err(map_err)?;
    let request_id: String = row.try_get("request_id").map_err(map_err)?;
    let status_str: String = row.try_get("status").map_err(map_err)?;
    let text: String = row.try_get("text").map_err(map_err)?;
    let voice: String = row.try_get("voice").map_err(map_err)?;
    let sample_rate: u32 = row.try_get::<i64, _>("sample_rate").map_err(map_err)? as u32;
    let format_str: String = row.try_get("format").map_err(map_err)?;
    let enable_subtitle: bool = row.try_get("enable_subtitle").map_err(map_err)?;
    let enable_notify: bool = row.try_get("enable_notify").map_err(map_err)?;
    let notify_url: Option<String> = row.try_get("notify_url").map_err(map_err)?;
    let audio_address: Option<String> = row.try_get("audio_address").map_err(map_err)?;
    let sentences_json: String = row.try_get("sentences").map_err(map_err)?;
    let error_code: Option<i64> = row.try_get("error_code").map_err(map_err)?;
    let error_message: Option<String> = row.try_get("error_message").map_err(map_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_err)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(map_err)?;
    let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at").map_err(map_err)?;

    let sentences: Vec<TtsSentenceTiming> = serde_json::from_str(&sentences_json).unwrap_or_default();

    Ok(AsyncTtsTask {
        task_id: TaskId::from(task_id),
        request_id,
        status: status_from_str(&status_str),
        text,
        voice,
        sample_rate,
        format: format_from_str(&format_str),
        enable_subtitle,
        enable_notify,
        notify_url,
        audio_address,
        sentences,
        error_code: error_code.map(|c| c as u32),
        error_message,
        created_at,
        updated_at,
        completed_at,
    })
}
