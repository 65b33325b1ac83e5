use std::env;
use std::path::PathBuf;
use std::time::Duration;

use once_cell::sync::Lazy;
use tracing::warn;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "imagem-editada.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyProfile {
    Standard,
    Permissive,
}

impl SafetyProfile {
    pub const fn threshold(self) -> &'static str {
        match self {
            SafetyProfile::Standard => "BLOCK_MEDIUM_AND_ABOVE",
            SafetyProfile::Permissive => "OFF",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_image_model: String,
    pub gemini_safety_settings: SafetyProfile,
    pub gemini_request_timeout: Option<Duration>,
    pub download_dir: PathBuf,
    pub download_filename: String,
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

/// Log settings are read before `CONFIG` so that warnings raised while
/// loading it reach an installed subscriber.
pub fn log_level_from_env() -> String {
    env_string("LOG_LEVEL", "info").to_lowercase()
}

pub fn log_dir_from_env() -> PathBuf {
    PathBuf::from(env_string("LOG_DIR", "logs"))
}

fn normalize_safety_settings(value: &str) -> SafetyProfile {
    let lowered = value.trim().to_lowercase();
    match lowered.as_str() {
        "" | "standard" => SafetyProfile::Standard,
        "permissive" | "off" | "none" => SafetyProfile::Permissive,
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}'; defaulting to standard.",
                value
            );
            SafetyProfile::Standard
        }
    }
}

fn normalize_api_base(value: String) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_GEMINI_API_BASE.to_string();
    }
    trimmed.to_string()
}

impl Config {
    /// Reads the process environment. Nothing here is fatal: a missing API key
    /// surfaces as an error from the first edit request.
    pub fn load() -> Self {
        let gemini_api_key = env_non_empty("GEMINI_API_KEY")
            .or_else(|| env_non_empty("API_KEY"))
            .unwrap_or_default();

        let gemini_request_timeout = env_u64("GEMINI_REQUEST_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let download_filename = env_non_empty("DOWNLOAD_FILENAME")
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_string());

        Config {
            gemini_api_key,
            gemini_api_base: normalize_api_base(env_string(
                "GEMINI_API_BASE",
                DEFAULT_GEMINI_API_BASE,
            )),
            gemini_image_model: env_non_empty("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            gemini_safety_settings: normalize_safety_settings(&env_string(
                "GEMINI_SAFETY_SETTINGS",
                "standard",
            )),
            gemini_request_timeout,
            download_dir: PathBuf::from(env_string("DOWNLOAD_DIR", ".")),
            download_filename,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }

    pub fn download_path(&self, dir_override: Option<&str>) -> PathBuf {
        let dir = dir_override
            .map(PathBuf::from)
            .unwrap_or_else(|| self.download_dir.clone());
        dir.join(&self.download_filename)
    }
}
