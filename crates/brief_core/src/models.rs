use async_trait::async_trait;
use std::fmt;
use crate::error::ProviderError;

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    /// Human readable backend name, used in logs
    fn name(&self) -> &str;

    /// Send a single prompt and return the model's raw text.
    ///
    /// Implementations do no parsing and no retries. Text that is empty after
    /// trimming must be reported as [`ProviderError::EmptyResponse`].
    async fn invoke(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}

/// Shared guard for backends: reject blank completions.
pub fn non_empty(text: String) -> std::result::Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_rejects_whitespace() {
        assert!(matches!(non_empty("  \n\t".to_string()), Err(ProviderError::EmptyResponse)));
        assert_eq!(non_empty("{}".to_string()).unwrap(), "{}");
    }
}
