//! Shared app-under-test construction for the integration tests in this directory.

use std::sync::Arc;

use serving_core::Settings;
use serving_db::TestDb;
use serving_engine::{EnginePool, EngineReplica, InferenceExecutor, StubEngine};
use serving_http::bootstrap::{AppContext, CorsConfig};
use serving_http::voice_registry::VoiceRegistry;

/// Builds an `AppContext` wired to an in-memory database and a single CPU stub
/// replica, without starting a TCP listener. Callers pass the context into
/// `serving_http::build_router` directly, or use `tower::ServiceExt::oneshot`.
pub async fn test_context(settings: Settings) -> Arc<AppContext> {
    let replicas = vec![EngineReplica {
        device: serving_engine::Device::Cpu,
        file_asr: Some(Arc::new(StubEngine::new())),
        streaming_asr: Some(Arc::new(StubEngine::new())),
        preset_tts: Some(Arc::new(StubEngine::new())),
        clone_tts: Some(Arc::new(StubEngine::new())),
    }];
    let pool = Arc::new(EnginePool::new(replicas).expect("non-empty replica list"));
    let executor = Arc::new(InferenceExecutor::new(settings.inference_thread_pool_size));
    let voice_registry = Arc::new(VoiceRegistry::from_pool(&pool));

    let db = TestDb::new().await.expect("in-memory database");
    let task_store = Arc::new(db.async_task_store());
    // Leak the TestDb's pool lifetime into the returned context's lifetime by boxing it
    // as a trait object; the in-memory pool lives as long as the Arc does.
    let task_store: Arc<dyn serving_core::ports::AsyncTaskStorePort> = task_store;

    Arc::new(AppContext {
        settings: Arc::new(settings),
        pool,
        executor,
        task_store,
        voice_registry,
        cors: CorsConfig::AllowAll,
    })
}

pub fn settings_no_auth() -> Settings {
    Settings { app_token: None, app_key: None, ..Settings::default() }
}

pub fn settings_with_token(token: &str) -> Settings {
    Settings { app_token: Some(token.to_string()), app_key: None, ..Settings::default() }
}

/// Binds the router to an ephemeral local port and serves it on a background task, for
/// tests that need a real WebSocket upgrade rather than an in-process `oneshot` call.
/// Returns the `ws://` base URL; the server task is aborted when the returned handle drops.
pub async fn spawn_test_server(ctx: Arc<AppContext>) -> (String, tokio::task::JoinHandle<()>) {
    let router = serving_http::build_router(ctx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    (format!("ws://{addr}"), handle)
}
