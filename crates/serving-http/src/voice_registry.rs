//! Voice catalog (§4.5, §4.4 "the voice registry has a read-mostly map; writes occur
//! only at refresh", §5). Backed by `RwLock`, matching the spec's read-mostly resource
//! model: readers (the listing endpoints, the clone/preset routing decision) take a
//! read lock; `refresh` takes a write lock and rebuilds the catalog from the pool's
//! first replica's `known_voices()`.

use std::sync::RwLock;

use serving_engine::EnginePool;

#[derive(Debug, Clone, Default)]
struct Catalog {
    preset_voices: Vec<String>,
    clone_voices: Vec<String>,
}

pub struct VoiceRegistry {
    catalog: RwLock<Catalog>,
}

impl VoiceRegistry {
    /// Builds the registry from the pool's first replica, mirroring the pool
    /// construction assumption that every replica loads the same model set.
    #[must_use]
    pub fn from_pool(pool: &EnginePool) -> Self {
        let registry = Self { catalog: RwLock::new(Catalog::default()) };
        registry.refresh(pool);
        registry
    }

    /// Rebuilds the catalog from the pool. Called at startup and by `POST /stream/v1/tts/voices/refresh`.
    pub fn refresh(&self, pool: &EnginePool) {
        let preset_voices = pool.preset_tts(0).map(|e| e.known_voices()).unwrap_or_default();
        let clone_voices = pool.clone_tts(0).map(|e| e.known_voices()).unwrap_or_default();

        let mut catalog = self.catalog.write().unwrap_or_else(|e| e.into_inner());
        catalog.preset_voices = preset_voices;
        catalog.clone_voices = clone_voices;
    }

    #[must_use]
    pub fn preset_voices(&self) -> Vec<String> {
        self.catalog.read().unwrap_or_else(|e| e.into_inner()).preset_voices.clone()
    }

    #[must_use]
    pub fn clone_voices(&self) -> Vec<String> {
        self.catalog.read().unwrap_or_else(|e| e.into_inner()).clone_voices.clone()
    }

    #[must_use]
    pub fn is_clone_voice(&self, voice: &str) -> bool {
        self.catalog.read().unwrap_or_else(|e| e.into_inner()).clone_voices.iter().any(|v| v == voice)
    }

    #[must_use]
    pub fn is_preset_voice(&self, voice: &str) -> bool {
        self.catalog.read().unwrap_or_else(|e| e.into_inner()).preset_voices.iter().any(|v| v == voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serving_engine::{Device, EngineReplica, StubEngine};
    use std::sync::Arc;

    fn one_replica_pool() -> EnginePool {
        EnginePool::new(vec![EngineReplica {
            device: Device::Cpu,
            file_asr: Some(Arc::new(StubEngine::new())),
            streaming_asr: Some(Arc::new(StubEngine::new())),
            preset_tts: Some(Arc::new(StubEngine::new())),
            clone_tts: Some(Arc::new(StubEngine::new())),
        }])
        .unwrap()
    }

    #[test]
    fn registry_reflects_stub_engine_catalog() {
        let pool = one_replica_pool();
        let registry = VoiceRegistry::from_pool(&pool);
        assert!(registry.is_preset_voice("中文女"));
        assert!(registry.is_clone_voice("demo"));
        assert!(!registry.is_clone_voice("中文女"));
    }

    #[test]
    fn refresh_is_idempotent() {
        let pool = one_replica_pool();
        let registry = VoiceRegistry::from_pool(&pool);
        registry.refresh(&pool);
        assert_eq!(registry.preset_voices().len(), 4);
    }
}
