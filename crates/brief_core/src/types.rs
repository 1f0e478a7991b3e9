use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A source article, keyed by URL. Owned by the ingestion side; the synthesis
/// pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    /// Source domain, e.g. `reuters.com`.
    pub source: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl Article {
    pub fn new(url: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            url: url.into(),
            title: title.into(),
            source: source.into(),
            topic: String::new(),
            content: String::new(),
            published_at: now,
            fetched_at: now,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn fetched_on(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = at;
        self
    }
}

/// How a source reference got its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The model supplied an absolute URL.
    #[default]
    Provided,
    ExactTitle,
    TitleFragment,
    Domain,
    /// Added for a development the model left without sources.
    Synthesized,
    /// Copied from an article by the fallback brief.
    Article,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReference {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub resolution: Resolution,
}

impl SourceReference {
    pub fn from_article(article: &Article, resolution: Resolution) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            source: article.source.clone(),
            resolution,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Unresolved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Development {
    pub headline: String,
    #[serde(default)]
    pub takeaways: Vec<String>,
    pub sources: Vec<SourceReference>,
}

/// Why a brief had to be produced without the model's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Provider,
    Parse,
    Shape,
}

/// A source reference that no article could be matched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationGap {
    pub headline: String,
    pub claimed_title: String,
    pub claimed_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brief {
    pub date: NaiveDate,
    pub domain: String,
    pub executive_summary: String,
    pub developments: Vec<Development>,
    pub sentiment_summary: String,
    pub trends: String,
    pub what_to_watch: String,
    pub article_count: usize,
    pub is_fallback: bool,
    #[serde(default)]
    pub fallback_reason: Option<FallbackReason>,
    /// Model output exactly as received, kept for audit.
    #[serde(default)]
    pub raw_response: String,
    #[serde(default)]
    pub gaps: Vec<ReconciliationGap>,
    pub generated_at: DateTime<Utc>,
}

/// Prior briefs are read back with the same shape they were written with.
pub type HistoricalBrief = Brief;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_defaults_to_provided() {
        let reference: SourceReference = serde_json::from_str(
            r#"{"title": "Visa Launches Agent Toolkit", "url": "https://x.com/a"}"#,
        )
        .unwrap();
        assert_eq!(reference.resolution, Resolution::Provided);
        assert!(reference.source.is_empty());
        assert!(reference.is_resolved());
    }

    #[test]
    fn test_brief_serializes_snake_case_tags() {
        let brief = Brief {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            domain: "payments".to_string(),
            executive_summary: String::new(),
            developments: vec![],
            sentiment_summary: String::new(),
            trends: String::new(),
            what_to_watch: String::new(),
            article_count: 0,
            is_fallback: true,
            fallback_reason: Some(FallbackReason::Parse),
            raw_response: String::new(),
            gaps: vec![],
            generated_at: Utc::now(),
        };
        let value = serde_json::to_value(&brief).unwrap();
        assert_eq!(value["date"], "2025-03-01");
        assert_eq!(value["fallback_reason"], "parse");
    }
}
