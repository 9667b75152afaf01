//! Composition utilities for building the async-task store.
//!
//! Focused purely on construction; no domain logic.

use std::sync::Arc;

use serving_core::ports::AsyncTaskStorePort;
use sqlx::SqlitePool;

use crate::repositories::SqliteAsyncTaskStore;

pub struct CoreFactory;

impl CoreFactory {
    /// Create a `SQLite` connection pool from a connection URL.
    pub async fn create_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect(db_url).await?;
        Ok(pool)
    }

    /// Create an in-memory `SQLite` pool for testing.
    pub async fn create_test_pool() -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        Ok(pool)
    }

    /// Build the async-task store port from a pool, as a trait object ready for
    /// injection into the HTTP layer's app state.
    #[must_use]
    pub fn async_task_store(pool: SqlitePool) -> Arc<dyn AsyncTaskStorePort> {
        Arc::new(SqliteAsyncTaskStore::new(pool))
    }
}

/// Test database helper: an in-memory `SQLite` database with the full schema applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    pub async fn new() -> anyhow::Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        crate::setup::create_async_tts_schema(&pool).await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[must_use]
    pub fn async_task_store(&self) -> SqliteAsyncTaskStore {
        SqliteAsyncTaskStore::new(self.pool.clone())
    }
}
