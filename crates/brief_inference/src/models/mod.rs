use std::sync::Arc;
use brief_core::Result;
use tracing::info;
use crate::{Config, ModelBackend};

pub mod anthropic;
pub mod deepseek;
pub mod dummy;
pub mod ollama;

pub use anthropic::AnthropicModel;
pub use brief_core::InferenceModel;
pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;
pub use ollama::OllamaModel;

/// Build the backend selected by `config.backend`.
pub async fn create_model(config: Config) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match config.backend {
        ModelBackend::DeepSeek => Arc::new(DeepSeekModel::new(&config)?),
        ModelBackend::Anthropic => Arc::new(AnthropicModel::new(&config)?),
        ModelBackend::Ollama => Arc::new(OllamaModel::new(&config)?),
        ModelBackend::Dummy => Arc::new(DummyModel::new()),
    };
    info!("🧠 Inference backend ready: {}", model.name());
    Ok(model)
}
