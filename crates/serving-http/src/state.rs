//! Shared application state type.

use std::sync::Arc;

use crate::bootstrap::AppContext;

/// Application state shared across all handlers: an `Arc`-wrapped [`AppContext`]
/// carrying the settings, engine pool, inference executor, and async-task store.
pub type AppState = Arc<AppContext>;
