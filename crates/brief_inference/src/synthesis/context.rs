//! Memory of prior briefs, rendered as a prompt section so the model can
//! avoid re-reporting yesterday's stories.

use serde::{Deserialize, Serialize};
use brief_core::HistoricalBrief;
use super::truncate_chars;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextLimits {
    /// How many prior briefs are considered at all
    pub history_days: usize,
    pub development_briefs: usize,
    pub development_lines: usize,
    pub watch_briefs: usize,
    pub sentiment_briefs: usize,
    pub sentiment_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            history_days: 7,
            development_briefs: 5,
            development_lines: 15,
            watch_briefs: 3,
            sentiment_briefs: 3,
            sentiment_chars: 100,
        }
    }
}

pub const CONTEXT_HEADER: &str = "HISTORICAL CONTEXT (recent briefs, newest first):";

/// Render `history` (newest first) into the context block. Returns an empty
/// string when there is nothing to say, so callers can skip the section.
pub fn build_context(history: &[HistoricalBrief], limits: &ContextLimits) -> String {
    let history = &history[..history.len().min(limits.history_days)];

    let developments: Vec<String> = history
        .iter()
        .take(limits.development_briefs)
        .flat_map(|brief| {
            brief
                .developments
                .iter()
                .map(|d| d.headline.trim())
                .filter(|headline| !headline.is_empty())
                .map(move |headline| format!("- [{}] {}", brief.date, headline))
        })
        .take(limits.development_lines)
        .collect();

    let watch: Vec<String> = history
        .iter()
        .take(limits.watch_briefs)
        .filter(|brief| !brief.what_to_watch.trim().is_empty())
        .map(|brief| format!("- [{}] {}", brief.date, brief.what_to_watch.trim()))
        .collect();

    let sentiment: Vec<String> = history
        .iter()
        .take(limits.sentiment_briefs)
        .filter(|brief| !brief.sentiment_summary.trim().is_empty())
        .map(|brief| {
            format!(
                "- [{}] {}",
                brief.date,
                truncate_chars(brief.sentiment_summary.trim(), limits.sentiment_chars)
            )
        })
        .collect();

    let sections = [
        ("Previously reported developments:", developments),
        ("Previous watch items:", watch),
        ("Previous sentiment:", sentiment),
    ];

    let mut block = String::new();
    for (title, lines) in sections.iter().filter(|(_, lines)| !lines.is_empty()) {
        if block.is_empty() {
            block.push_str(CONTEXT_HEADER);
            block.push('\n');
        }
        block.push_str(title);
        block.push('\n');
        for line in lines {
            block.push_str(line);
            block.push('\n');
        }
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::{Brief, Development};
    use chrono::{Duration, NaiveDate, Utc};

    fn brief(days_ago: i64, headlines: usize) -> Brief {
        let date = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap() - Duration::days(days_ago);
        Brief {
            date,
            domain: "payments".to_string(),
            executive_summary: "summary".to_string(),
            developments: (0..headlines)
                .map(|i| Development {
                    headline: format!("Story {} from {}", i, date),
                    takeaways: vec![],
                    sources: vec![],
                })
                .collect(),
            sentiment_summary: "x".repeat(250),
            trends: "trends".to_string(),
            what_to_watch: format!("Watch item from {}", date),
            article_count: headlines,
            is_fallback: false,
            fallback_reason: None,
            raw_response: String::new(),
            gaps: vec![],
            generated_at: Utc::now(),
        }
    }

    fn prior_development_lines(block: &str) -> usize {
        block
            .split("Previous watch items:")
            .next()
            .unwrap_or_default()
            .lines()
            .filter(|line| line.starts_with("- "))
            .count()
    }

    #[test]
    fn test_empty_history_gives_empty_block() {
        assert_eq!(build_context(&[], &ContextLimits::default()), "");
    }

    #[test]
    fn test_ten_briefs_cap_development_lines() {
        let history: Vec<Brief> = (1..=10).map(|d| brief(d, 4)).collect();
        let block = build_context(&history, &ContextLimits::default());

        assert!(block.starts_with(CONTEXT_HEADER));
        assert_eq!(prior_development_lines(&block), 15);
        // Newest first until the line cap: 4 + 4 + 4 + 3
        assert!(block.contains("Story 2 from 2025-03-16"));
        assert!(!block.contains("Story 3 from 2025-03-16"));
        assert!(!block.contains("from 2025-03-15"));
    }

    #[test]
    fn test_watch_and_sentiment_caps() {
        let history: Vec<Brief> = (1..=6).map(|d| brief(d, 1)).collect();
        let block = build_context(&history, &ContextLimits::default());

        assert_eq!(block.matches("Watch item from").count(), 3);
        let sentiment_lines: Vec<&str> = block
            .split("Previous sentiment:")
            .nth(1)
            .unwrap()
            .lines()
            .filter(|line| line.starts_with("- "))
            .collect();
        assert_eq!(sentiment_lines.len(), 3);
        for line in sentiment_lines {
            assert_eq!(line.matches('x').count(), 100);
        }
    }

    #[test]
    fn test_briefs_without_content_emit_nothing() {
        let mut empty = brief(1, 0);
        empty.what_to_watch = String::new();
        empty.sentiment_summary = "  ".to_string();
        assert_eq!(build_context(&[empty], &ContextLimits::default()), "");
    }

    #[test]
    fn test_limits_are_tunable() {
        let history: Vec<Brief> = (1..=3).map(|d| brief(d, 4)).collect();
        let limits = ContextLimits {
            development_lines: 2,
            watch_briefs: 1,
            ..ContextLimits::default()
        };
        let block = build_context(&history, &limits);
        assert_eq!(prior_development_lines(&block), 2);
        assert_eq!(block.matches("Watch item from").count(), 1);
    }
}
