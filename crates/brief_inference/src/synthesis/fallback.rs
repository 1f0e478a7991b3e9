use chrono::{NaiveDate, Utc};
use brief_core::{Article, Brief, Development, FallbackReason, Resolution, SourceReference};

pub const NEUTRAL_SENTIMENT: &str = "Neutral: sentiment was not assessed for this brief.";
pub const NO_ARTICLES_SUMMARY: &str = "No new articles were collected for this period.";

fn trends_for(domain: &str) -> String {
    format!("No trend analysis is available; coverage of {} continues.", domain)
}

fn watch_for(domain: &str) -> String {
    format!("Follow-up reporting on the {} stories listed in this brief.", domain)
}

/// The dedicated brief for a day with no articles. No model is consulted,
/// and it is not an error fallback.
pub fn empty_brief(date: NaiveDate, domain: &str) -> Brief {
    Brief {
        date,
        domain: domain.to_string(),
        executive_summary: NO_ARTICLES_SUMMARY.to_string(),
        developments: Vec::new(),
        sentiment_summary: NEUTRAL_SENTIMENT.to_string(),
        trends: trends_for(domain),
        what_to_watch: watch_for(domain),
        article_count: 0,
        is_fallback: false,
        fallback_reason: None,
        raw_response: String::new(),
        gaps: Vec::new(),
        generated_at: Utc::now(),
    }
}

/// Brief built straight from the articles when the model's output is
/// unusable. Every source is copied from an article, so it is grounded by
/// construction.
pub fn fallback_brief(
    date: NaiveDate,
    domain: &str,
    articles: &[Article],
    reason: FallbackReason,
    raw_response: String,
    max_developments: usize,
) -> Brief {
    let developments = articles
        .iter()
        .take(max_developments)
        .map(|article| Development {
            headline: article.title.clone(),
            takeaways: Vec::new(),
            sources: vec![SourceReference::from_article(article, Resolution::Article)],
        })
        .collect();

    Brief {
        date,
        domain: domain.to_string(),
        executive_summary: format!(
            "Automated synthesis was unavailable. {} {} article(s) were collected; the leading stories are listed below without analysis.",
            articles.len(),
            domain
        ),
        developments,
        sentiment_summary: NEUTRAL_SENTIMENT.to_string(),
        trends: trends_for(domain),
        what_to_watch: watch_for(domain),
        article_count: articles.len(),
        is_fallback: true,
        fallback_reason: Some(reason),
        raw_response,
        gaps: Vec::new(),
        generated_at: Utc::now(),
    }
}
