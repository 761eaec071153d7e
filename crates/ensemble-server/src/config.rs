//! Configuration file support

use ensemble_ai::{ClientConfig, DEFAULT_ENDPOINT, RetryConfig};
use ensemble_core::SandboxConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the ensemble server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub inference: InferenceSettings,
    pub generation: GenerationSettings,
}

/// HTTP listener and UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Serve the bundled front-end from `static_dir`
    pub serve_ui: bool,
    /// Front-end build directory containing `index.html` and `static/`
    pub static_dir: PathBuf,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            serve_ui: false,
            static_dir: PathBuf::from("app/frontend/build"),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3001".to_string(),
            ],
        }
    }
}

/// Inference endpoint settings. The credential itself only comes from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 60_000,
        }
    }
}

/// Character generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub stagger_ms: u64,
    pub max_characters: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            stagger_ms: 1000,
            max_characters: 10,
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ensemble")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("ENSEMBLE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults if it is missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        Self::default().save()?;
        Ok(path)
    }

    /// Apply `ENSEMBLE_HOST`, `ENSEMBLE_PORT` and `SERVE_UI` from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("ENSEMBLE_HOST") {
            self.server.host = host;
        }
        if let Some(raw) = lookup("ENSEMBLE_PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(
                    "Invalid ENSEMBLE_PORT='{}', keeping {}",
                    raw,
                    self.server.port
                ),
            }
        }
        if let Some(serve_ui) = lookup("SERVE_UI") {
            self.server.serve_ui = serve_ui.eq_ignore_ascii_case("true");
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.inference.endpoint.clone(),
            timeout: Duration::from_secs(self.inference.timeout_secs),
            retry: RetryConfig {
                max_retries: self.inference.max_retries,
                initial_delay: Duration::from_millis(self.inference.initial_delay_ms),
                max_delay: Duration::from_millis(self.inference.max_delay_ms),
                ..RetryConfig::default()
            },
        }
    }

    pub fn sandbox_config(&self) -> SandboxConfig {
        SandboxConfig {
            stagger: Duration::from_millis(self.generation.stagger_ms),
            max_characters: self.generation.max_characters,
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# ensemble configuration file
# Place at ~/.config/ensemble/config.toml (Linux), or point ENSEMBLE_CONFIG_PATH at it.
# The inference credential is never read from this file: set CHAI_API_BEARER_TOKEN.

[server]
host = "0.0.0.0"
port = 8000
# Serve the front-end build (also settable with SERVE_UI=true)
serve_ui = false
static_dir = "app/frontend/build"
cors_origins = ["http://localhost:3000", "http://localhost:3001"]

[inference]
timeout_secs = 60
# Retries apply to HTTP 429 only
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 60000

[generation]
# Delay between the starts of consecutive character generations
stagger_ms = 1000
max_characters = 10
"#
}
