//! Database setup and initialization.
//!
//! Provides `setup_database()` for initializing the `SQLite` database with the
//! `async_tts_tasks` schema. Entry points call this with the resolved database path.

use anyhow::Result;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use std::path::Path;

/// Sets up the `SQLite` database connection and ensures the schema exists.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened/created or schema creation fails.
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new().filename(db_path).create_if_missing(true),
    )
    .await?;

    create_async_tts_schema(&pool).await?;

    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing, with the full production schema.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    create_async_tts_schema(&pool).await?;
    Ok(pool)
}

/// Creates the `async_tts_tasks` table and its indexes. Safe to call repeatedly — all
/// statements use `IF NOT EXISTS`.
pub(crate) async fn create_async_tts_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS async_tts_tasks (
            task_id TEXT PRIMARY KEY NOT NULL,
            request_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'RUNNING',
            text TEXT NOT NULL,
            voice TEXT NOT NULL,
            sample_rate INTEGER NOT NULL,
            format TEXT NOT NULL,
            enable_subtitle INTEGER NOT NULL DEFAULT 0,
            enable_notify INTEGER NOT NULL DEFAULT 0,
            notify_url TEXT,
            audio_address TEXT,
            sentences TEXT NOT NULL DEFAULT '[]',
            error_code INTEGER,
            error_message TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            completed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_async_tts_tasks_status ON async_tts_tasks(status)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_async_tts_tasks_created_at ON async_tts_tasks(created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
