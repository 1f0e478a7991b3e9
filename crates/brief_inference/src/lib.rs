use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use brief_core::ProviderError;

pub mod models;
pub mod synthesis;

/// Which model backend a [`Config`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelBackend {
    DeepSeek,
    Anthropic,
    #[default]
    Ollama,
    Dummy,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::DeepSeek => "deepseek",
            ModelBackend::Anthropic => "anthropic",
            ModelBackend::Ollama => "ollama",
            ModelBackend::Dummy => "dummy",
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deepseek" | "openai" => Ok(ModelBackend::DeepSeek),
            "anthropic" | "claude" => Ok(ModelBackend::Anthropic),
            "ollama" => Ok(ModelBackend::Ollama),
            "dummy" => Ok(ModelBackend::Dummy),
            other => Err(format!(
                "Unknown model backend: {}. Available backends: ollama, deepseek, anthropic, dummy",
                other
            )),
        }
    }
}

#[derive(Clone, Default)]
pub struct Config {
    pub backend: ModelBackend,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    /// Base URL of the backend API (for Ollama: `http://host:port/model`)
    pub model_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Backend specific settings derived from the shared [`Config`].
pub trait ModelConfig {
    fn from_config(config: &Config) -> Self;
}

pub(crate) fn http_client(config: &Config) -> std::result::Result<reqwest::Client, ProviderError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

pub mod prelude {
    pub use super::{Config, ModelBackend};
    pub use super::models::create_model;
    pub use super::synthesis::{BriefSynthesizer, SynthesisConfig};
    pub use brief_core::{Article, Brief, Error, Result};
}

pub use models::create_model;
pub use synthesis::{BriefSynthesizer, SynthesisConfig};
