//! Pluggable AI backend abstraction
//!
//! The assistant only ever needs one thing from a model: turn a
//! [`ChatRequest`] into reply text. Backends implement [`ChatBackend`];
//! [`AIClient`] wraps them for Clone and compile-time dispatch.
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = AssistantConfig::load()?;
//! let client = AIClient::from_config(&config)
//!     .ok_or_else(|| anyhow!("GEMINI_API_KEY not set"))?;
//!
//! let reply = client.complete(&ChatRequest::prompt("Olá")).await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-pro)
//! - `GEMINI_HOST`: API base URL

mod gemini;
mod mock;
pub mod types;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use types::*;

use async_trait::async_trait;

use crate::config::{AssistantConfig, BackendKind};
use crate::error::Result;

/// Interface for all AI backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Produce reply text for the request
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini (HTTP API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from resolved config
    ///
    /// Returns None when the gemini backend is selected but no API key is set.
    pub fn from_config(config: &AssistantConfig) -> Option<Self> {
        match config.backend {
            BackendKind::Gemini => GeminiBackend::from_config(&config.gemini).map(AIClient::Gemini),
            BackendKind::Mock => Some(AIClient::Mock(MockBackend::new())),
        }
    }

    /// Create a client from environment variables only
    pub fn from_env() -> Option<Self> {
        let mut config = AssistantConfig::default();
        config.apply_env();
        Self::from_config(&config)
    }

    pub fn gemini(host: &str, model: &str, api_key: &str) -> Self {
        AIClient::Gemini(GeminiBackend::new(host, model, api_key))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Gemini(b) => AIClient::Gemini(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Gemini(_) => BackendKind::Gemini.as_str(),
            AIClient::Mock(_) => BackendKind::Mock.as_str(),
        }
    }
}

impl From<MockBackend> for AIClient {
    fn from(backend: MockBackend) -> Self {
        AIClient::Mock(backend)
    }
}

impl From<GeminiBackend> for AIClient {
    fn from(backend: GeminiBackend) -> Self {
        AIClient::Gemini(backend)
    }
}

// Implement ChatBackend for AIClient by delegating to the inner backend
#[async_trait]
impl ChatBackend for AIClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.complete(request).await,
            AIClient::Mock(b) => b.complete(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_key() {
        let config = AssistantConfig::default();
        assert!(AIClient::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_mock() {
        let config = AssistantConfig {
            backend: BackendKind::Mock,
            ..Default::default()
        };
        let client = AIClient::from_config(&config).unwrap();
        assert_eq!(client.backend_name(), "mock");
        assert_eq!(client.with_model("other").model(), "other");
    }
}
