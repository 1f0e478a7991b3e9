use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use brief_core::models::non_empty;
use brief_core::{InferenceModel, ProviderError};
use crate::{http_client, Config, ModelConfig};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnthropicModelConfig {
    base_url: String,
    model_name: String,
}

impl ModelConfig for AnthropicModelConfig {
    fn from_config(config: &Config) -> Self {
        Self {
            base_url: config
                .model_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model_name: config.model_name.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

pub struct AnthropicModel {
    client: Arc<Client>,
    api_key: String,
    config: AnthropicModelConfig,
}

impl AnthropicModel {
    pub fn new(config: &Config) -> std::result::Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::Configuration("Anthropic API key is required".to_string()))?;
        Ok(Self {
            client: Arc::new(http_client(config)?),
            api_key,
            config: AnthropicModelConfig::from_config(config),
        })
    }
}

impl fmt::Debug for AnthropicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.config.base_url)
            .field("model_name", &self.config.model_name)
            .finish()
    }
}

/// Concatenate the text blocks of a messages response. Tool use and other
/// block kinds carry no prose and are skipped.
fn collect_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("")
}

#[async_trait]
impl InferenceModel for AnthropicModel {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn invoke(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let request = MessagesRequest {
            model: &self.config.model_name,
            max_tokens: MAX_TOKENS,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self.client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<MessagesResponse>()
            .await?;

        non_empty(collect_text(response))
    }
}
