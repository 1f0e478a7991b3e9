use std::fmt;
use async_trait::async_trait;
use brief_core::models::non_empty;
use brief_core::{InferenceModel, ProviderError};
use url::Url;
use crate::{Config, ModelConfig};

#[cfg(feature = "ollama")]
use {
    langchain_rust::language_models::llm::LLM,
    langchain_rust::llm::client::GenerationOptions,
    langchain_rust::llm::ollama::client::{Ollama, OllamaClient},
    std::sync::Arc,
};

#[cfg(not(feature = "ollama"))]
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL_URL: &str = "http://localhost:11434/llama3.1";
const DEFAULT_MODEL: &str = "llama3.1";
const DEFAULT_PORT: u16 = 11434;

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaModelConfig {
    ollama_host: String,
    ollama_port: u16,
    model_name: String,
}

impl Default for OllamaModelConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost".to_string(),
            ollama_port: DEFAULT_PORT,
            model_name: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ModelConfig for OllamaModelConfig {
    fn from_config(config: &Config) -> Self {
        let url = config.model_url.clone().unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());
        let Ok(parsed_url) = Url::parse(&url) else {
            tracing::warn!("⚠️ Invalid Ollama URL {}, using {}", url, DEFAULT_MODEL_URL);
            return Self::default();
        };

        // The path carries the model name; --model-name wins over it
        let path_model = parsed_url.path().trim_matches('/').to_string();
        let model_name = config
            .model_name
            .clone()
            .or_else(|| (!path_model.is_empty()).then_some(path_model))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            ollama_host: format!("{}://{}", parsed_url.scheme(), parsed_url.host_str().unwrap_or("localhost")),
            ollama_port: parsed_url.port().unwrap_or(DEFAULT_PORT),
            model_name,
        }
    }
}

impl OllamaModelConfig {
    pub fn get_ollama_host(&self) -> &str {
        &self.ollama_host
    }

    pub fn get_ollama_port(&self) -> u16 {
        self.ollama_port
    }

    pub fn get_model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(not(feature = "ollama"))]
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[cfg(not(feature = "ollama"))]
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Local Ollama server. Built with the `ollama` feature it goes through
/// langchain-rust; otherwise it calls `/api/generate` directly.
pub struct OllamaModel {
    config: OllamaModelConfig,
    #[cfg(feature = "ollama")]
    ollama_client: Ollama,
    #[cfg(not(feature = "ollama"))]
    client: reqwest::Client,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("host", &self.config.ollama_host)
            .field("port", &self.config.ollama_port)
            .field("model_name", &self.config.model_name)
            .finish()
    }
}

impl OllamaModel {
    pub fn new(config: &Config) -> std::result::Result<Self, ProviderError> {
        let model_config = OllamaModelConfig::from_config(config);

        #[cfg(feature = "ollama")]
        {
            let client = Arc::new(OllamaClient::new(
                model_config.get_ollama_host(),
                model_config.get_ollama_port(),
            ));
            let ollama_client = Ollama::new(
                client,
                model_config.get_model_name().to_string(),
                Some(GenerationOptions::default()),
            );
            Ok(Self {
                config: model_config,
                ollama_client,
            })
        }

        #[cfg(not(feature = "ollama"))]
        {
            Ok(Self {
                config: model_config,
                client: crate::http_client(config)?,
            })
        }
    }

    pub fn config(&self) -> &OllamaModelConfig {
        &self.config
    }
}

#[async_trait]
impl InferenceModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn invoke(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        #[cfg(feature = "ollama")]
        {
            let response = self.ollama_client.invoke(prompt).await.map_err(|e| {
                ProviderError::Transport(format!(
                    "Ollama is not available at {}:{}: {}",
                    self.config.ollama_host, self.config.ollama_port, e
                ))
            })?;
            non_empty(response)
        }

        #[cfg(not(feature = "ollama"))]
        {
            let request = GenerateRequest {
                model: &self.config.model_name,
                prompt,
                stream: false,
            };
            let response = self.client
                .post(format!(
                    "{}:{}/api/generate",
                    self.config.ollama_host, self.config.ollama_port
                ))
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<GenerateResponse>()
                .await?;
            non_empty(response.response)
        }
    }
}
