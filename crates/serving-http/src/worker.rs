//! Background async-TTS worker (§4.6) — single loop per process, polling `RUNNING`
//! tasks, synthesizing them sentence by sentence, persisting terminal state, and
//! POSTing the result to a callback URL when requested.

use std::sync::Arc;
use std::time::Duration;

use serving_core::domain::{AsyncTtsTask, AsyncTtsTaskStatus, TtsSentenceTiming};
use serving_core::status;
use serving_engine::{ReplicaGuard, encode_pcm16le, split_sentences, wrap_wav};

use crate::bootstrap::AppContext;
use crate::dto::http::AsyncTtsQueryResponse;

const POLL_BATCH: u32 = 5;
const NORMAL_SLEEP: Duration = Duration::from_secs(2);
const ERROR_SLEEP: Duration = Duration::from_secs(5);
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(30);
const REAP_AFTER_DAYS: i64 = 7;

pub struct AsyncTtsWorker {
    ctx: Arc<AppContext>,
    http: reqwest::Client,
}

impl AsyncTtsWorker {
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let http = reqwest::Client::builder().timeout(CALLBACK_TIMEOUT).build().unwrap_or_default();
        Self { ctx, http }
    }

    /// Runs forever. Intended to be `tokio::spawn`ed once at startup (§4.6 step 4).
    pub async fn run(self) {
        loop {
            let outcome = self.run_once().await;
            match outcome {
                Ok(()) => tokio::time::sleep(NORMAL_SLEEP).await,
                Err(err) => {
                    tracing::error!(error = %err, "async TTS worker iteration failed");
                    tokio::time::sleep(ERROR_SLEEP).await;
                }
            }
        }
    }

    async fn run_once(&self) -> anyhow::Result<()> {
        let tasks = self.ctx.task_store.poll_running(POLL_BATCH).await?;
        for task in tasks {
            if let Err(err) = self.process_task(&task).await {
                tracing::warn!(task_id = %task.task_id, error = %err, "async TTS task failed");
                let _ = self
                    .ctx
                    .task_store
                    .complete(
                        &task.task_id,
                        AsyncTtsTaskStatus::Failed,
                        None,
                        Vec::new(),
                        Some(status::DEFAULT_SERVER_ERROR),
                        Some(err.to_string()),
                    )
                    .await;
                self.notify(&task, AsyncTtsTaskStatus::Failed, None, &[], Some(err.to_string())).await;
            }
        }

        let reaped = self.ctx.task_store.reap(REAP_AFTER_DAYS).await?;
        if reaped > 0 {
            tracing::info!(count = reaped, "reaped terminal async TTS tasks");
        }
        Ok(())
    }

    /// Segmented synthesis: split long text into sentences, synthesize each, and
    /// concatenate audio while recording `{text, beginTime, endTime}` triplets (§4.6
    /// step 2).
    async fn process_task(&self, task: &AsyncTtsTask) -> anyhow::Result<()> {
        let guard = ReplicaGuard::acquire(&self.ctx.pool);
        let sentences = split_sentences(&task.text);

        let mut pcm_samples: Vec<f32> = Vec::new();
        let mut timings = Vec::new();
        let mut cursor_ms: u64 = 0;

        for sentence in sentences {
            let chunks = self.synthesize_sentence(&sentence, task, guard.index).await?;
            let begin_ms = cursor_ms;
            for chunk in &chunks {
                pcm_samples.extend_from_slice(chunk);
                cursor_ms += (chunk.len() as u64 * 1000) / u64::from(task.sample_rate.max(1));
            }
            timings.push(TtsSentenceTiming { text: sentence, begin_time_ms: begin_ms, end_time_ms: cursor_ms });
        }

        let pcm_bytes = encode_pcm16le(&pcm_samples);
        let framed = match task.format {
            serving_core::domain::TtsFormat::Pcm => pcm_bytes,
            _ => wrap_wav(&pcm_bytes, task.sample_rate),
        };

        let extension = match task.format {
            serving_core::domain::TtsFormat::Pcm => "pcm",
            serving_core::domain::TtsFormat::Wav => "wav",
            serving_core::domain::TtsFormat::Mp3 => "wav", // §9: MP3 is advertised but never re-encoded
        };
        let filename = format!("{}.{extension}", task.task_id);
        std::fs::create_dir_all(&self.ctx.settings.temp_dir)?;
        std::fs::write(self.ctx.settings.temp_dir.join(&filename), &framed)?;
        let audio_address = format!("/tmp/{filename}");

        self.ctx
            .task_store
            .complete(
                &task.task_id,
                AsyncTtsTaskStatus::Success,
                Some(audio_address.clone()),
                timings.clone(),
                Some(status::SUCCESS),
                Some("SUCCESS".to_string()),
            )
            .await?;

        self.notify(task, AsyncTtsTaskStatus::Success, Some(audio_address), &timings, None).await;
        Ok(())
    }

    async fn synthesize_sentence(
        &self,
        text: &str,
        task: &AsyncTtsTask,
        engine_index: usize,
    ) -> anyhow::Result<Vec<Vec<f32>>> {
        let pool = &self.ctx.pool;
        let routed_to_clone =
            pool.clone_tts(engine_index).ok().is_some_and(|clone| clone.has_voice(&task.voice));

        if routed_to_clone {
            let clone = pool.clone_tts(engine_index)?;
            let chunks =
                clone.synthesize_clone(text, &task.voice, 1.0, task.sample_rate, 50, None, task.format).await?;
            return Ok(chunks);
        }

        let preset = pool.preset_tts(engine_index)?;
        let chunks = preset.synthesize_preset(text, &task.voice, 1.0, task.sample_rate, 50, task.format).await?;
        Ok(chunks)
    }

    /// Best-effort callback delivery (§4.6 step 5): failure to deliver never affects
    /// the already-persisted task state.
    async fn notify(
        &self,
        task: &AsyncTtsTask,
        status: AsyncTtsTaskStatus,
        audio_address: Option<String>,
        sentences: &[TtsSentenceTiming],
        error_message: Option<String>,
    ) {
        if !task.enable_notify {
            return;
        }
        let Some(url) = task.notify_url.as_ref() else { return };

        let body = AsyncTtsQueryResponse {
            status: 200,
            error_code: if status == AsyncTtsTaskStatus::Success {
                serving_core::status::SUCCESS
            } else {
                serving_core::status::DEFAULT_SERVER_ERROR
            },
            error_message: error_message.unwrap_or_else(|| "SUCCESS".to_string()),
            task_id: task.task_id.to_string(),
            audio_address,
            sentences: sentences.to_vec(),
            notify_custom: task.notify_url.clone(),
        };

        match self.http.post(url).json(&body).send().await {
            Ok(resp) => tracing::info!(task_id = %task.task_id, status = %resp.status(), "delivered async TTS callback"),
            Err(err) => tracing::warn!(task_id = %task.task_id, error = %err, "async TTS callback delivery failed"),
        }
    }
}
