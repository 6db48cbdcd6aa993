//! Configuration loading.
//!
//! Settings come from an optional JSON file in the platform config
//! directory, overridden by `MOODQUEUE_*` environment variables. Missing
//! catalog credentials are not an error at load time; the catalog client
//! reports them with a setup message on first use, so read-only commands
//! keep working without any configuration.
//!
//! ## File location
//!
//! - Linux: `~/.config/moodqueue/config.json`
//! - macOS: `~/Library/Application Support/moodqueue/config.json`
//! - Windows: `%APPDATA%\moodqueue\config.json`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_INFER_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_INFER_MODEL: &str = "llama-3.1-8b-instant";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub inference: InferenceConfig,
}

/// Catalog Web API access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Mood-inference service settings. Inference stays disabled until an API
/// key is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_INFER_BASE_URL.to_string(),
            model: DEFAULT_INFER_MODEL.to_string(),
        }
    }
}

/// Platform config file location (`<config dir>/moodqueue/config.json`).
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("moodqueue").join("config.json"))
}

/// Load configuration: file defaults when the file exists, then environment
/// overrides on top.
pub fn load() -> Result<Config> {
    load_from(config_file_path().as_deref())
}

/// Same as [`load`], with an explicit file path for tests.
pub fn load_from(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) if path.exists() => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        _ => Config::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var("MOODQUEUE_CLIENT_ID") {
        config.catalog.client_id = value;
    }
    if let Ok(value) = std::env::var("MOODQUEUE_CLIENT_SECRET") {
        config.catalog.client_secret = value;
    }
    if let Ok(value) = std::env::var("MOODQUEUE_TOKEN_URL") {
        config.catalog.token_url = value;
    }
    if let Ok(value) = std::env::var("MOODQUEUE_API_BASE_URL") {
        config.catalog.api_base_url = value;
    }
    if let Ok(value) = std::env::var("MOODQUEUE_INFER_API_KEY") {
        if !value.is_empty() {
            config.inference.api_key = Some(value);
        }
    }
    if let Ok(value) = std::env::var("MOODQUEUE_INFER_BASE_URL") {
        config.inference.base_url = value;
    }
    if let Ok(value) = std::env::var("MOODQUEUE_INFER_MODEL") {
        config.inference.model = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_public_endpoints() {
        let config = Config::default();
        assert_eq!(config.catalog.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.catalog.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.inference.base_url, DEFAULT_INFER_BASE_URL);
        assert_eq!(config.inference.model, DEFAULT_INFER_MODEL);
        assert!(config.catalog.client_id.is_empty());
        assert!(config.inference.api_key.is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_from(Some(Path::new("/nonexistent/moodqueue/config.json")))
            .expect("missing file is not an error");
        assert_eq!(config.catalog.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).expect("create config");
        write!(file, r#"{{"catalog": {{"client_id": "abc"}}}}"#).expect("write config");

        let config = load_from(Some(&path)).expect("valid config");
        assert_eq!(config.catalog.client_id, "abc");
        assert_eq!(config.catalog.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.inference.model, DEFAULT_INFER_MODEL);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").expect("write config");
        assert!(load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = Config::default();
        config.catalog.client_id = "id".to_string();
        config.inference.api_key = Some("key".to_string());

        let raw = serde_json::to_string(&config).expect("serializes");
        let parsed: Config = serde_json::from_str(&raw).expect("parses");
        assert_eq!(parsed.catalog.client_id, "id");
        assert_eq!(parsed.inference.api_key.as_deref(), Some("key"));
    }
}
