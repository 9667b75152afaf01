//! Environment-driven configuration, grounded in the original `Settings` class.

use std::env;
use std::path::PathBuf;

/// Which ASR sub-models a replica loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsrModelMode {
    All,
    Offline,
    Realtime,
}

/// Which TTS sub-models a replica loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsModelMode {
    All,
    CosyVoice1,
    CosyVoice2,
}

/// Which clone-prompt format the clone engine expects, independent of [`TtsModelMode`]
/// (which only controls which sub-models are loaded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneModelVersion {
    CosyVoice2,
    CosyVoice3,
}

/// Process-wide configuration, loaded once at startup and shared as `Arc<Settings>`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub workers: usize,

    pub app_token: Option<String>,
    pub app_key: Option<String>,

    pub asr_gpus: String,
    pub tts_gpus: String,
    pub asr_model_mode: AsrModelMode,
    pub tts_model_mode: TtsModelMode,
    pub clone_model_version: CloneModelVersion,

    pub asr_enable_realtime_punc: bool,
    pub asr_enable_nearfield_filter: bool,
    pub asr_nearfield_rms_threshold: f32,

    pub inference_thread_pool_size: usize,

    pub temp_dir: PathBuf,
    pub max_text_length: usize,

    pub log_level: String,
    pub log_dir: Option<PathBuf>,

    pub database_path: PathBuf,
}

/// Minimum length a configured token must have to be honored (§6.3 resolution).
pub const MIN_TOKEN_LEN: usize = 10;

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            workers: 1,
            app_token: None,
            app_key: None,
            asr_gpus: String::new(),
            tts_gpus: String::new(),
            asr_model_mode: AsrModelMode::All,
            tts_model_mode: TtsModelMode::All,
            clone_model_version: CloneModelVersion::CosyVoice2,
            asr_enable_realtime_punc: false,
            asr_enable_nearfield_filter: false,
            asr_nearfield_rms_threshold: 0.015,
            inference_thread_pool_size: num_cpus::get().max(4),
            temp_dir: PathBuf::from("./tmp"),
            max_text_length: 5000,
            log_level: "info".to_string(),
            log_dir: None,
            database_path: PathBuf::from("./data/serving.db"),
        }
    }
}

impl Settings {
    /// Load from environment variables, falling back to [`Settings::default`] for any
    /// variable that is unset or fails to parse.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env_or("HOST", defaults.host),
            port: env_parsed("PORT", defaults.port),
            debug: env_bool("DEBUG", defaults.debug),
            workers: env_parsed("WORKERS", defaults.workers),
            app_token: env::var("APPTOKEN").ok().filter(|s| !s.is_empty()),
            app_key: env::var("APPKEY").ok().filter(|s| !s.is_empty()),
            asr_gpus: env_or("ASR_GPUS", defaults.asr_gpus),
            tts_gpus: env_or("TTS_GPUS", defaults.tts_gpus),
            asr_model_mode: env::var("ASR_MODEL_MODE")
                .ok()
                .and_then(|v| parse_asr_model_mode(&v))
                .unwrap_or(defaults.asr_model_mode),
            tts_model_mode: env::var("TTS_MODEL_MODE")
                .ok()
                .and_then(|v| parse_tts_model_mode(&v))
                .unwrap_or(defaults.tts_model_mode),
            clone_model_version: env::var("CLONE_MODEL_VERSION")
                .ok()
                .and_then(|v| parse_clone_model_version(&v))
                .unwrap_or(defaults.clone_model_version),
            asr_enable_realtime_punc: env_bool("ASR_ENABLE_REALTIME_PUNC", defaults.asr_enable_realtime_punc),
            asr_enable_nearfield_filter: env_bool(
                "ASR_ENABLE_NEARFIELD_FILTER",
                defaults.asr_enable_nearfield_filter,
            ),
            asr_nearfield_rms_threshold: env_parsed(
                "ASR_NEARFIELD_RMS_THRESHOLD",
                defaults.asr_nearfield_rms_threshold,
            ),
            inference_thread_pool_size: env_parsed(
                "INFERENCE_THREAD_POOL_SIZE",
                defaults.inference_thread_pool_size,
            ),
            temp_dir: env::var("TEMP_DIR").map(PathBuf::from).unwrap_or(defaults.temp_dir),
            max_text_length: env_parsed("MAX_TEXT_LENGTH", defaults.max_text_length),
            log_level: env_or("LOG_LEVEL", defaults.log_level),
            log_dir: env::var("LOG_DIR").ok().map(PathBuf::from),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
        }
    }

    /// Whether auth should be enforced at all (an unset `APPTOKEN` means auth is optional).
    #[must_use]
    pub fn auth_required(&self) -> bool {
        self.app_token.as_ref().is_some_and(|t| t.len() >= MIN_TOKEN_LEN)
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_asr_model_mode(v: &str) -> Option<AsrModelMode> {
    match v.to_ascii_lowercase().as_str() {
        "all" => Some(AsrModelMode::All),
        "offline" => Some(AsrModelMode::Offline),
        "realtime" => Some(AsrModelMode::Realtime),
        _ => None,
    }
}

fn parse_tts_model_mode(v: &str) -> Option<TtsModelMode> {
    match v.to_ascii_lowercase().as_str() {
        "all" => Some(TtsModelMode::All),
        "cosyvoice1" => Some(TtsModelMode::CosyVoice1),
        "cosyvoice2" => Some(TtsModelMode::CosyVoice2),
        _ => None,
    }
}

fn parse_clone_model_version(v: &str) -> Option<CloneModelVersion> {
    match v.to_ascii_lowercase().as_str() {
        "cosyvoice2" => Some(CloneModelVersion::CosyVoice2),
        "cosyvoice3" => Some(CloneModelVersion::CosyVoice3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_realtime_punc_is_off() {
        assert!(!Settings::default().asr_enable_realtime_punc);
    }

    #[test]
    fn auth_optional_without_token() {
        let settings = Settings { app_token: None, ..Settings::default() };
        assert!(!settings.auth_required());
    }

    #[test]
    fn short_token_does_not_enable_auth() {
        let settings = Settings { app_token: Some("short".to_string()), ..Settings::default() };
        assert!(!settings.auth_required());
    }

    #[test]
    fn long_enough_token_enables_auth() {
        let settings =
            Settings { app_token: Some("a-long-enough-token".to_string()), ..Settings::default() };
        assert!(settings.auth_required());
    }

    #[test]
    fn clone_model_version_defaults_to_cosyvoice2() {
        assert_eq!(Settings::default().clone_model_version, CloneModelVersion::CosyVoice2);
    }

    #[test]
    fn clone_model_version_parses_cosyvoice3() {
        assert_eq!(parse_clone_model_version("CosyVoice3"), Some(CloneModelVersion::CosyVoice3));
        assert_eq!(parse_clone_model_version("bogus"), None);
    }
}
