//! Assistant configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/luma/config/assistant.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied last:
//! - `AI_BACKEND`: gemini or mock
//! - `GEMINI_API_KEY`: API key (required for the gemini backend)
//! - `GEMINI_MODEL`: model name
//! - `GEMINI_HOST`: API base URL

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/assistant.toml");

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const HOST_ENV: &str = "GEMINI_HOST";
pub const BACKEND_ENV: &str = "AI_BACKEND";

/// Which AI backend answers assistant requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Gemini,
    /// Canned replies, no network
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown AI backend: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gemini API settings
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL
    pub host: String,
    pub model: String,
    /// Never read from the embedded default
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            host: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-pro".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

/// Chat session settings
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Messages replayed with each request, excluding the welcome message
    pub history_limit: usize,
    pub welcome_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            welcome_message: "Olá! Eu sou a Luma, sua assistente financeira. Como posso ajudar?"
                .to_string(),
        }
    }
}

/// Resolved assistant configuration
#[derive(Debug, Clone, Default)]
pub struct AssistantConfig {
    pub backend: BackendKind,
    pub gemini: GeminiConfig,
    pub chat: ChatConfig,
    /// File the config was read from, if not the embedded default
    pub source: Option<PathBuf>,
}

impl AssistantConfig {
    /// Load from the default override path (or embedded default), then env
    pub fn load() -> Result<Self> {
        let mut config = load_config(None)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit path (or embedded default if missing), then env
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = load_config(Some(path))?;
        config.apply_env();
        Ok(config)
    }

    /// Parse TOML content over the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Apply process environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(BACKEND_ENV) {
            match backend.parse() {
                Ok(kind) => self.backend = kind,
                Err(e) => tracing::warn!(backend = %backend, error = %e, "Ignoring AI_BACKEND"),
            }
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.gemini.model = model;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.gemini.host = host.trim_end_matches('/').to_string();
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("luma").join("config").join("assistant.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AssistantConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
            tracing::debug!(path = %path.display(), "Loaded assistant config override");
            let mut config = parse_config(&content)?;
            config.source = Some(path);
            Ok(config)
        }
        None => parse_config(DEFAULT_CONFIG),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    backend: Option<RawBackend>,
    gemini: Option<RawGemini>,
    chat: Option<RawChat>,
}

#[derive(Debug, Deserialize)]
struct RawBackend {
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGemini {
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    history_limit: Option<usize>,
    welcome_message: Option<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AssistantConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AssistantConfig::default();

    if let Some(kind) = raw.backend.and_then(|b| b.kind) {
        config.backend = kind.parse().map_err(Error::Config)?;
    }

    if let Some(gemini) = raw.gemini {
        if let Some(host) = gemini.host {
            config.gemini.host = host.trim_end_matches('/').to_string();
        }
        if let Some(model) = gemini.model {
            config.gemini.model = model;
        }
        if let Some(key) = gemini.api_key.filter(|k| !k.is_empty()) {
            config.gemini.api_key = Some(key);
        }
        if let Some(timeout) = gemini.timeout_secs {
            config.gemini.timeout = Duration::from_secs(timeout);
        }
        if let Some(temperature) = gemini.temperature {
            config.gemini.temperature = temperature;
        }
        if let Some(max_tokens) = gemini.max_output_tokens {
            config.gemini.max_output_tokens = max_tokens;
        }
    }

    if let Some(chat) = raw.chat {
        if let Some(limit) = chat.history_limit {
            config.chat.history_limit = limit;
        }
        if let Some(welcome) = chat.welcome_message {
            config.chat.welcome_message = welcome;
        }
    }

    Ok(config)
}
