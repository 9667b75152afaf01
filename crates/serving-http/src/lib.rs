//! Axum WebSocket/HTTP adapter exposing the ASR/TTS serving core (§6).
//!
//! Wires `serving-core`'s ports, `serving-engine`'s pool, and `serving-db`'s task store
//! behind the wire protocol in [`serving_core::protocol`]. [`bootstrap`] builds the
//! shared [`bootstrap::AppContext`]; [`routes::build_router`] and [`bootstrap::start_server`]
//! expose it over the network.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Declared for the bootstrap/worker modules' use, or reserved for a binary crate that
// links against this library (tracing-subscriber, async-trait's derive-only use sites).
use async_trait as _;
use chrono as _;
use futures_util as _;
use tokio_stream as _;
use tracing_subscriber as _;

#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use hyper as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

pub mod asr_session;
pub mod auth;
pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tts_session;
pub mod voice_registry;
pub mod worker;

pub use bootstrap::{AppContext, CorsConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::build_router;
pub use state::AppState;
