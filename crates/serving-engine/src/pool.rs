//! Multi-engine pool: least-active-count selection with round-robin tiebreak, and
//! session-affinity handles (§4.2).

use std::sync::Mutex;

use serving_core::{CloneTts, EngineHealth, FileAsr, PresetTts, StreamingAsr};

use crate::engine::EngineReplica;
use crate::error::EngineError;

/// Pool of engine replicas, one per resolved device (§4.2 pool construction).
///
/// The active-count array is guarded by one mutex; hold time is O(replica count), per
/// the spec's resource model (§5).
pub struct EnginePool {
    replicas: Vec<EngineReplica>,
    active_count: Mutex<Vec<usize>>,
}

impl EnginePool {
    /// Fails if `replicas` is empty (mirrors "if none succeed, fail startup").
    pub fn new(replicas: Vec<EngineReplica>) -> Result<Self, EngineError> {
        if replicas.is_empty() {
            return Err(EngineError::NoReplicasConstructed("no devices resolved".to_string()));
        }
        let active_count = Mutex::new(vec![0; replicas.len()]);
        Ok(Self { replicas, active_count })
    }

    /// Selects the replica with the lowest active count (first index on ties), and
    /// increments its counter. Must be paired with exactly one [`Self::release`].
    #[must_use]
    pub fn select(&self) -> usize {
        let mut counts = self.active_count.lock().unwrap_or_else(|e| e.into_inner());
        let (index, _) = counts
            .iter()
            .enumerate()
            .min_by_key(|&(_, &count)| count)
            .expect("pool is never empty");
        counts[index] += 1;
        index
    }

    /// Decrements the replica's active count, floored at 0.
    pub fn release(&self, index: usize) {
        let mut counts = self.active_count.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = counts.get_mut(index) {
            *count = count.saturating_sub(1);
        }
    }

    #[must_use]
    pub fn active_counts(&self) -> Vec<usize> {
        self.active_count.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[must_use]
    pub fn replica(&self, index: usize) -> &EngineReplica {
        &self.replicas[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    #[must_use]
    pub fn health(&self) -> Vec<EngineHealth> {
        self.replicas.iter().map(EngineReplica::health).collect()
    }

    pub fn file_asr(&self, index: usize) -> Result<&dyn FileAsr, EngineError> {
        self.replicas[index]
            .file_asr
            .as_deref()
            .ok_or_else(|| EngineError::CapabilityNotSupported("FileASR".to_string()))
    }

    pub fn streaming_asr(&self, index: usize) -> Result<&dyn StreamingAsr, EngineError> {
        self.replicas[index]
            .streaming_asr
            .as_deref()
            .ok_or_else(|| EngineError::CapabilityNotSupported("StreamingASR".to_string()))
    }

    pub fn preset_tts(&self, index: usize) -> Result<&dyn PresetTts, EngineError> {
        self.replicas[index]
            .preset_tts
            .as_deref()
            .ok_or_else(|| EngineError::CapabilityNotSupported("PresetTTS".to_string()))
    }

    pub fn clone_tts(&self, index: usize) -> Result<&dyn CloneTts, EngineError> {
        self.replicas[index]
            .clone_tts
            .as_deref()
            .ok_or_else(|| EngineError::CapabilityNotSupported("CloneTTS".to_string()))
    }
}

/// RAII guard for one-shot calls: selects on construction, releases on drop. Streaming
/// sessions hold the replica index directly instead (their lifetime doesn't nest neatly
/// inside a single async call), and call `release` explicitly on every exit path.
pub struct ReplicaGuard<'a> {
    pool: &'a EnginePool,
    pub index: usize,
}

impl<'a> ReplicaGuard<'a> {
    #[must_use]
    pub fn acquire(pool: &'a EnginePool) -> Self {
        let index = pool.select();
        Self { pool, index }
    }
}

impl Drop for ReplicaGuard<'_> {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StubEngine;
    use std::sync::Arc;

    fn two_replica_pool() -> EnginePool {
        let make = |d| EngineReplica {
            device: d,
            file_asr: Some(Arc::new(StubEngine::new())),
            streaming_asr: Some(Arc::new(StubEngine::new())),
            preset_tts: Some(Arc::new(StubEngine::new())),
            clone_tts: Some(Arc::new(StubEngine::new())),
        };
        EnginePool::new(vec![
            make(crate::device::Device::Cpu),
            make(crate::device::Device::Cuda(0)),
        ])
        .unwrap()
    }

    #[test]
    fn empty_replica_list_fails_construction() {
        assert!(EnginePool::new(Vec::new()).is_err());
    }

    #[test]
    fn select_picks_least_active_with_round_robin_tiebreak() {
        let pool = two_replica_pool();
        assert_eq!(pool.select(), 0);
        assert_eq!(pool.select(), 1);
        assert_eq!(pool.active_counts(), vec![1, 1]);
    }

    #[test]
    fn release_floors_at_zero() {
        let pool = two_replica_pool();
        pool.release(0);
        assert_eq!(pool.active_counts(), vec![0, 0]);
    }

    #[test]
    fn counts_return_to_zero_after_all_guards_drop() {
        let pool = two_replica_pool();
        {
            let _g1 = ReplicaGuard::acquire(&pool);
            let _g2 = ReplicaGuard::acquire(&pool);
            assert_eq!(pool.active_counts(), vec![1, 1]);
        }
        assert_eq!(pool.active_counts(), vec![0, 0]);
    }

    #[test]
    fn active_counts_never_go_negative() {
        let pool = two_replica_pool();
        pool.release(0);
        pool.release(0);
        pool.release(1);
        assert!(pool.active_counts().iter().all(|&c| c == 0));
    }
}
