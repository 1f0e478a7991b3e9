use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use brief_core::{InferenceModel, ProviderError};
use serde_json::json;

#[derive(Debug, Clone)]
enum Script {
    /// Cite every article title found in the prompt, without URLs
    Echo,
    Respond(String),
    Transport(String),
    Auth(String),
}

/// Offline backend. By default it answers with a fenced JSON brief that
/// cites the prompt's article titles but leaves their URLs blank, so dry runs
/// exercise extraction and reconciliation end to end.
pub struct DummyModel {
    script: Script,
    calls: AtomicUsize,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel")
            .field("script", &self.script)
            .field("calls", &self.calls())
            .finish()
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self::scripted(Script::Echo)
    }

    pub fn responding(text: impl Into<String>) -> Self {
        Self::scripted(Script::Respond(text.into()))
    }

    pub fn failing_transport(message: impl Into<String>) -> Self {
        Self::scripted(Script::Transport(message.into()))
    }

    pub fn failing_auth(message: impl Into<String>) -> Self {
        Self::scripted(Script::Auth(message.into()))
    }

    fn scripted(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `invoke` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn echo_titles(prompt: &str) -> String {
    let developments: Vec<_> = prompt
        .lines()
        .filter_map(|line| line.strip_prefix("Title: "))
        .take(5)
        .map(|title| {
            json!({
                "headline": title.trim(),
                "takeaways": [],
                "sources": [{"title": title.trim(), "url": "", "source": ""}],
            })
        })
        .collect();

    let brief = json!({
        "executive_summary": format!("{} stories collected.", developments.len()),
        "developments": developments,
        "sentiment_summary": "Neutral.",
        "trends": "No trend analysis in offline mode.",
        "what_to_watch": "Nothing flagged in offline mode.",
    });
    format!("Here is the brief:\n```json\n{:#}\n```", brief)
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn invoke(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Echo => Ok(echo_titles(prompt)),
            Script::Respond(text) if text.trim().is_empty() => Err(ProviderError::EmptyResponse),
            Script::Respond(text) => Ok(text.clone()),
            Script::Transport(message) => Err(ProviderError::Transport(message.clone())),
            Script::Auth(message) => Err(ProviderError::Auth(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();
        let prompt = "Article 1:\nTitle: Visa Launches Agent Toolkit\nURL: https://x.com/a\n";
        let response = model.invoke(prompt).await.unwrap();
        assert!(response.contains("Visa Launches Agent Toolkit"));
        assert!(response.contains("```json"));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let model = DummyModel::failing_auth("bad key");
        assert!(matches!(model.invoke("x").await, Err(ProviderError::Auth(_))));

        let model = DummyModel::responding("   ");
        assert!(matches!(model.invoke("x").await, Err(ProviderError::EmptyResponse)));
        assert_eq!(model.calls(), 1);
    }
}
