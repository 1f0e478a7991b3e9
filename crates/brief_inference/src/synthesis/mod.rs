//! Daily brief synthesis: history → prompt → model → JSON → reconciled brief,
//! with a fallback brief standing in for any stage that fails.

use std::fmt;
use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use brief_core::{
    Article, ArticleStorage, Brief, BriefStorage, FallbackReason, HistoricalBrief, InferenceModel,
    ProviderError, Result,
};

pub mod context;
pub mod extract;
pub mod fallback;
pub mod payload;
pub mod prompt;
pub mod reconcile;

pub use context::{build_context, ContextLimits};
pub use extract::extract_json;
pub use payload::BriefPayload;
pub use prompt::{compose_prompt, content_budget, PromptLimits};
pub use reconcile::{reconcile, Reconciled};

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("no usable JSON in model response: {0}")]
    Parse(String),

    #[error("model response has the wrong shape: {0}")]
    Shape(String),
}

impl SynthesisError {
    pub fn reason(&self) -> FallbackReason {
        match self {
            SynthesisError::Provider(_) => FallbackReason::Provider,
            SynthesisError::Parse(_) => FallbackReason::Parse,
            SynthesisError::Shape(_) => FallbackReason::Shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub context: ContextLimits,
    pub prompt: PromptLimits,
    pub max_developments: usize,
    pub fallback_developments: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            context: ContextLimits::default(),
            prompt: PromptLimits::default(),
            max_developments: 5,
            fallback_developments: 5,
        }
    }
}

/// Longest prefix of `text` with at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub struct BriefSynthesizer {
    model: Arc<dyn InferenceModel>,
    config: SynthesisConfig,
}

impl fmt::Debug for BriefSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BriefSynthesizer")
            .field("model", &self.model.name())
            .field("config", &self.config)
            .finish()
    }
}

impl BriefSynthesizer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self::with_config(model, SynthesisConfig::default())
    }

    pub fn with_config(model: Arc<dyn InferenceModel>, config: SynthesisConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Produce exactly one brief for `date`. Never fails: model, parse and
    /// shape failures all yield a fallback brief built from `articles`.
    /// `history` is ordered newest first.
    pub async fn synthesize(
        &self,
        date: NaiveDate,
        domain: &str,
        articles: &[Article],
        history: &[HistoricalBrief],
    ) -> Brief {
        if articles.is_empty() {
            info!("📭 No articles for {}, skipping the model", date);
            return fallback::empty_brief(date, domain);
        }

        let context = build_context(history, &self.config.context);
        let prompt = compose_prompt(articles, domain, &context, &self.config.prompt);
        debug!(
            "Composed prompt: {} chars, {} articles, {} context chars",
            prompt.len(),
            articles.len(),
            context.len()
        );

        info!("🤖 Requesting brief from {} ({} articles)", self.model.name(), articles.len());
        let raw = match self.model.invoke(&prompt).await.and_then(brief_core::models::non_empty) {
            Ok(raw) => raw,
            Err(e) => return self.fall_back(date, domain, articles, e.into(), String::new()),
        };
        debug!("Model returned {} chars", raw.len());

        match self.assemble(date, domain, articles, &raw) {
            Ok(brief) => {
                info!(
                    "✨ Brief for {} ready: {} developments, {} unresolved sources",
                    date,
                    brief.developments.len(),
                    brief.gaps.len()
                );
                brief
            }
            Err(e) => self.fall_back(date, domain, articles, e, raw),
        }
    }

    fn assemble(&self, date: NaiveDate, domain: &str, articles: &[Article], raw: &str) -> std::result::Result<Brief, SynthesisError> {
        let value = extract_json(raw)?;
        let payload = BriefPayload::from_value(value, self.config.max_developments)?;
        let Reconciled { developments, gaps } = reconcile(payload.developments, articles);

        Ok(Brief {
            date,
            domain: domain.to_string(),
            executive_summary: payload.executive_summary,
            developments,
            sentiment_summary: payload.sentiment_summary,
            trends: payload.trends,
            what_to_watch: payload.what_to_watch,
            article_count: articles.len(),
            is_fallback: false,
            fallback_reason: None,
            raw_response: raw.to_string(),
            gaps,
            generated_at: Utc::now(),
        })
    }

    fn fall_back(&self, date: NaiveDate, domain: &str, articles: &[Article], error: SynthesisError, raw: String) -> Brief {
        warn!("⚠️ Falling back to article list for {}: {}", date, error);
        fallback::fallback_brief(
            date,
            domain,
            articles,
            error.reason(),
            raw,
            self.config.fallback_developments,
        )
    }

    /// Synthesize the brief for `date` from stored articles and prior briefs,
    /// then store it. Only storage failures are returned as errors.
    pub async fn run_for_day<S>(&self, storage: &S, date: NaiveDate, domain: &str) -> Result<Brief>
    where
        S: ArticleStorage + BriefStorage + ?Sized,
    {
        let day_articles = storage.articles_for_day(date).await?;
        let history = storage.recent_briefs(date, self.config.context.history_days).await?;
        info!(
            "📰 Synthesizing {} brief for {} from {} articles and {} prior briefs",
            domain,
            date,
            day_articles.len(),
            history.len()
        );

        let brief = self.synthesize(date, domain, &day_articles, &history).await;
        storage.store_brief(&brief).await?;
        info!("💾 Stored brief for {}", date);
        Ok(brief)
    }
}
