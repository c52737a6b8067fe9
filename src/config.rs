//! Runtime settings
//!
//! Built-in defaults, overridden by `MEMORYTHING_*` environment variables,
//! overridden in turn by command-line flags (applied in `main`).

use std::path::PathBuf;
use tracing::{debug, warn};

/// Tag index file, relative to the working directory
pub const DEFAULT_INDEX_FILE: &str = "suggestion_to_stl.json";

/// Folder holding the downloadable models
pub const DEFAULT_STL_DIR: &str = "stl";

/// Append-only log of custom requests
pub const DEFAULT_REQUEST_LOG: &str = "custom_suggestions.txt";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_INDEX: &str = "MEMORYTHING_INDEX";
const ENV_STL_DIR: &str = "MEMORYTHING_STL_DIR";
const ENV_REQUEST_LOG: &str = "MEMORYTHING_REQUEST_LOG";
const ENV_MODEL: &str = "MEMORYTHING_MODEL";
const ENV_API_BASE: &str = "MEMORYTHING_API_BASE";
const ENV_TIMEOUT_MS: &str = "MEMORYTHING_TIMEOUT_MS";
const ENV_DOWNLOAD_DIR: &str = "MEMORYTHING_DOWNLOAD_DIR";

#[derive(Debug, Clone)]
pub struct Settings {
    pub index_path: PathBuf,
    pub stl_dir: PathBuf,
    pub request_log: PathBuf,
    pub model: String,
    pub api_base: String,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
    /// Where downloaded models are copied
    pub download_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(read_non_empty_env)
    }

    /// Build settings from any variable source; `lookup` returns `None` for unset names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            index_path: lookup(ENV_INDEX)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_FILE)),
            stl_dir: lookup(ENV_STL_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STL_DIR)),
            request_log: lookup(ENV_REQUEST_LOG)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REQUEST_LOG)),
            model: lookup(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: lookup(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout_ms: lookup(ENV_TIMEOUT_MS)
                .and_then(|raw| raw.parse::<u64>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
            api_key: lookup(ENV_API_KEY),
            download_dir: resolve_download_dir(lookup(ENV_DOWNLOAD_DIR), dirs::download_dir()),
        }
    }
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment. Variables already set are left alone.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
}

fn read_non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_download_dir(configured: Option<String>, platform: Option<PathBuf>) -> PathBuf {
    configured
        .map(PathBuf::from)
        .or(platform)
        .unwrap_or_else(|| PathBuf::from("."))
}
