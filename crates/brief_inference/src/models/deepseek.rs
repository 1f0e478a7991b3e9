use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use brief_core::models::non_empty;
use brief_core::{InferenceModel, ProviderError};
use crate::{http_client, Config, ModelConfig};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeepSeekModelConfig {
    base_url: String,
    model_name: String,
}

impl ModelConfig for DeepSeekModelConfig {
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

/// Chat-completions client. Works with any OpenAI compatible endpoint by
/// pointing `model_url` at it.
pub struct DeepSeekModel {
    client: Arc<Client>,
    api_key: String,
    config: DeepSeekModelConfig,
}

impl DeepSeekModel {
    pub fn new(config: &Config) -> std::result::Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::Configuration("DeepSeek API key is required".to_string()))?;
        Ok(Self {
            client: Arc::new(http_client(config)?),
            api_key,
            config: DeepSeekModelConfig::from_config(config),
        })
    }
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.config.base_url)
            .field("model_name", &self.config.model_name)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for DeepSeekModel {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn invoke(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.config.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        let response = self.client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse)?;
        non_empty(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_requires_api_key() {
        let result = DeepSeekModel::new(&Config::default());
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "backend misconfigured: DeepSeek API key is required"
        );

        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        assert!(DeepSeekModel::new(&config).is_ok());
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let config = DeepSeekModelConfig::from_config(&Config::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model_name, DEFAULT_MODEL);

        let config = DeepSeekModelConfig::from_config(&Config {
            model_url: Some("https://api.openai.com/v1/".to_string()),
            model_name: Some("gpt-4o-mini".to_string()),
            ..Config::default()
        });
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model_name, "gpt-4o-mini");
    }

    #[test]
    fn test_response_with_null_content_decodes() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
