//! Composition root (§10.4, §9 "one initialization authority per subsystem").
//!
//! Wires `Settings` into the engine pool, inference executor, async-task store, and
//! voice registry, and exposes the two entry points a binary crate needs:
//! [`bootstrap`] (build everything) and [`start_server`] (bind and serve).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use serving_core::Settings;
use serving_core::ports::AsyncTaskStorePort;
use serving_db::CoreFactory;
use serving_engine::{EngineReplica, EnginePool, InferenceExecutor, StubEngine, parse_device_spec};

use crate::voice_registry::VoiceRegistry;
use crate::worker::AsyncTtsWorker;

/// CORS policy. `AllowAll` mirrors the teacher's permissive dev default; production
/// deployments should configure `AllowOrigins`.
#[derive(Debug, Clone)]
pub enum CorsConfig {
    AllowAll,
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    #[must_use]
    pub fn with_allowed_origins(origins: Vec<String>) -> Self {
        if origins.is_empty() { Self::AllowAll } else { Self::AllowOrigins(origins) }
    }
}

pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::HeaderName::from_static("x-nls-token")]);

    match config {
        CorsConfig::AllowAll => layer.allow_origin(tower_http::cors::Any),
        CorsConfig::AllowOrigins(origins) => {
            let parsed: Vec<HeaderValue> =
                origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()).collect();
            layer.allow_origin(parsed)
        }
    }
}

/// Everything a handler needs, composed once at startup and shared behind `Arc`.
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub pool: Arc<EnginePool>,
    pub executor: Arc<InferenceExecutor>,
    pub task_store: Arc<dyn AsyncTaskStorePort>,
    pub voice_registry: Arc<VoiceRegistry>,
    pub cors: CorsConfig,
}

/// Builds one [`EngineReplica`] per resolved device, backed by the deterministic stub
/// engine (§4.2's Rust realization — no real GPU models are embedded, §1).
///
/// Device resolution is driven by `ASR_GPUS`; `TTS_GPUS` is not consulted separately
/// because the stub engine implements every capability uniformly on every replica. A
/// real multi-model deployment would resolve ASR and TTS device lists independently
/// and construct two pools — see `DESIGN.md` for this simplification.
fn build_pool(settings: &Settings) -> anyhow::Result<EnginePool> {
    let cuda_available = false;
    let devices = parse_device_spec(&settings.asr_gpus, cuda_available);

    let replicas: Vec<EngineReplica> = devices
        .into_iter()
        .map(|device| EngineReplica {
            device,
            file_asr: Some(Arc::new(StubEngine::new())),
            streaming_asr: Some(Arc::new(StubEngine::new())),
            preset_tts: Some(Arc::new(StubEngine::new())),
            clone_tts: Some(Arc::new(StubEngine::new())),
        })
        .collect();

    EnginePool::new(replicas).map_err(Into::into)
}

/// Builds the full application context: engine pool, inference executor, database
/// pool/task store, and voice registry. Does not start the HTTP listener or the
/// background worker.
pub async fn bootstrap(settings: Settings) -> anyhow::Result<Arc<AppContext>> {
    let settings = Arc::new(settings);

    let pool = Arc::new(build_pool(&settings)?);
    let executor = Arc::new(InferenceExecutor::new(settings.inference_thread_pool_size));

    let db_pool = serving_db::setup_database(&settings.database_path).await?;
    let task_store = CoreFactory::async_task_store(db_pool);

    let voice_registry = Arc::new(VoiceRegistry::from_pool(&pool));

    Ok(Arc::new(AppContext {
        settings,
        pool,
        executor,
        task_store,
        voice_registry,
        cors: CorsConfig::AllowAll,
    }))
}

/// Starts the background async-TTS worker (§4.6) and the HTTP/WS listener. The worker
/// is spawned exactly once here, at process startup, which trivially satisfies the
/// spec's "start if not running, idempotent, process-singleton" requirement (§4.6 step
/// 4) without needing a separate running-flag — see `DESIGN.md`.
pub async fn start_server(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let worker = AsyncTtsWorker::new(Arc::clone(&ctx));
    tokio::spawn(worker.run());

    let router = crate::routes::build_router(ctx.clone());
    let addr: SocketAddr = format!("{}:{}", ctx.settings.host, ctx.settings.port).parse()?;

    tracing::info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
