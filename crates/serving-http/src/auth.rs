//! Token/appkey validation (§6.3), grounded in the teacher's `embedded::validate_bearer`
//! middleware pattern, adapted for the two credential carriers this protocol uses:
//! the `X-NLS-Token` header (`/stream/*`, `/ws/*`) and `Authorization: Bearer` (the
//! OpenAI-compatible endpoint).

use axum::http::HeaderMap;

use serving_core::mask::mask;
use serving_core::settings::Settings;

use crate::error::HttpError;

pub const NLS_TOKEN_HEADER: &str = "x-nls-token";

/// Validates a token carried in `X-NLS-Token`. Auth is a no-op when `Settings::auth_required`
/// is false (no `APPTOKEN` configured, or it's shorter than `MIN_TOKEN_LEN`).
pub fn validate_nls_token(settings: &Settings, headers: &HeaderMap) -> Result<(), HttpError> {
    if !settings.auth_required() {
        return Ok(());
    }
    let expected = settings.app_token.as_deref().unwrap_or_default();
    let provided = headers.get(NLS_TOKEN_HEADER).and_then(|v| v.to_str().ok());

    match provided {
        Some(token) if token == expected => Ok(()),
        Some(token) => {
            tracing::warn!(provided = %mask(token), "rejected X-NLS-Token");
            Err(HttpError::Auth("invalid token".to_string()))
        }
        None => {
            tracing::warn!("missing X-NLS-Token header");
            Err(HttpError::Auth("missing X-NLS-Token header".to_string()))
        }
    }
}

/// Validates a token carried in `Authorization: Bearer <token>`.
pub fn validate_bearer_token(settings: &Settings, headers: &HeaderMap) -> Result<(), HttpError> {
    if !settings.auth_required() {
        return Ok(());
    }
    let expected = settings.app_token.as_deref().unwrap_or_default();
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(()),
        Some(token) => {
            tracing::warn!(provided = %mask(token), "rejected bearer token");
            Err(HttpError::Auth("invalid token".to_string()))
        }
        None => {
            tracing::warn!("missing or malformed Authorization header");
            Err(HttpError::Auth("missing bearer token".to_string()))
        }
    }
}

/// Validates an appkey supplied out-of-band (JSON field or query string) against
/// `Settings::app_key`. A configured `app_key` of `None` means appkey checking is
/// disabled, matching the token's opt-in behavior.
pub fn validate_appkey(settings: &Settings, provided: Option<&str>) -> Result<(), HttpError> {
    let Some(expected) = settings.app_key.as_deref() else {
        return Ok(());
    };
    match provided {
        Some(key) if key == expected => Ok(()),
        _ => {
            tracing::warn!("rejected appkey");
            Err(HttpError::Auth("invalid appkey".to_string()))
        }
    }
}
