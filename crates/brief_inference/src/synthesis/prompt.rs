use std::fmt::Write;
use serde::{Deserialize, Serialize};
use brief_core::Article;
use super::truncate_chars;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLimits {
    /// Upper bound on characters of body text per article
    pub max_article_chars: usize,
    /// Body text budget shared by all articles
    pub total_content_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            max_article_chars: 1500,
            total_content_chars: 8000,
        }
    }
}

/// Characters of body text each article may contribute to the prompt.
pub fn content_budget(article_count: usize, limits: &PromptLimits) -> usize {
    limits
        .max_article_chars
        .min(limits.total_content_chars / article_count.max(1))
}

const OUTPUT_CONTRACT: &str = r#"Respond with raw JSON only: no markdown, no code fences, no commentary before or after.
Use exactly this schema:
{
  "executive_summary": "2-3 sentence overview of the day",
  "developments": [
    {
      "headline": "short headline",
      "takeaways": ["insight that adds information beyond the headline"],
      "sources": [
        {"title": "article title as given above", "url": "https://full/article/url", "source": "domain.com"}
      ]
    }
  ],
  "sentiment_summary": "overall market and industry sentiment",
  "trends": "emerging patterns across the articles",
  "what_to_watch": "what to monitor next"
}"#;

/// Render the full instruction payload. `articles` must not be empty; the
/// synthesizer answers an empty day without calling the model.
pub fn compose_prompt(articles: &[Article], domain: &str, context: &str, limits: &PromptLimits) -> String {
    let budget = content_budget(articles.len(), limits);
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are an intelligence analyst writing a daily brief about {}.",
        domain
    );
    let _ = writeln!(
        prompt,
        "Below are {} articles collected today. Synthesize them into a brief.\n",
        articles.len()
    );

    if !context.trim().is_empty() {
        prompt.push_str(context.trim_end());
        prompt.push_str("\n\n");
    }

    prompt.push_str("ARTICLES:\n");
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(prompt, "Article {}:", i + 1);
        let _ = writeln!(prompt, "Title: {}", article.title);
        let _ = writeln!(prompt, "Source: {}", article.source);
        let _ = writeln!(prompt, "URL: {}", article.url);
        if !article.topic.is_empty() {
            let _ = writeln!(prompt, "Topic: {}", article.topic);
        }
        let _ = writeln!(prompt, "Published: {}", article.published_at.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(prompt, "Content: {}\n", truncate_chars(article.content.trim(), budget));
    }

    prompt.push_str("INSTRUCTIONS:\n");
    prompt.push_str("1. Identify the 3-5 most significant developments.\n");
    prompt.push_str(
        "2. When several articles cover the same story, consolidate them into ONE development \
         and list every covering article in its sources. Never repeat a story.\n",
    );
    prompt.push_str(
        "3. Each takeaway must add information that is not already in the headline. \
         Do not restate or paraphrase the headline as a takeaway.\n",
    );
    prompt.push_str(
        "4. Every source url must be the complete absolute URL exactly as listed above \
         (starting with http:// or https://), never a bare domain.\n",
    );
    if !context.trim().is_empty() {
        prompt.push_str(
            "5. Skip developments already reported in the historical context unless there is \
             a material update; if there is, say what changed.\n",
        );
    }
    prompt.push('\n');
    prompt.push_str(OUTPUT_CONTRACT);
    prompt.push('\n');
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(count: usize, body_len: usize) -> Vec<Article> {
        (0..count)
            .map(|i| {
                Article::new(
                    format!("https://news.example.com/{}", i),
                    format!("Headline {}", i),
                    "news.example.com",
                )
                .with_content("a".repeat(body_len))
            })
            .collect()
    }

    #[test]
    fn test_content_budget_scales_with_article_count() {
        let limits = PromptLimits::default();
        assert_eq!(content_budget(50, &limits), 160);
        assert_eq!(content_budget(2, &limits), 1500);
        assert_eq!(content_budget(6, &limits), 1333);
        assert_eq!(content_budget(0, &limits), 1500);
    }

    #[test]
    fn test_article_content_is_truncated_to_budget() {
        let prompt = compose_prompt(&articles(50, 1000), "payments", "", &PromptLimits::default());
        let body = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Content: "))
            .unwrap();
        assert_eq!(body.len(), 160);
    }

    #[test]
    fn test_prompt_carries_output_contract() {
        let prompt = compose_prompt(&articles(2, 10), "AI & Payments", "", &PromptLimits::default());
        assert!(prompt.contains("AI & Payments"));
        assert!(prompt.contains("raw JSON only"));
        assert!(prompt.contains("\"executive_summary\""));
        assert!(prompt.contains("consolidate them into ONE development"));
        assert!(prompt.contains("not already in the headline"));
        assert!(prompt.contains("complete absolute URL"));
        assert!(prompt.contains("URL: https://news.example.com/1"));
    }

    #[test]
    fn test_history_section_only_with_context() {
        let without = compose_prompt(&articles(1, 10), "payments", "", &PromptLimits::default());
        assert!(!without.contains("HISTORICAL CONTEXT"));
        assert!(!without.contains("historical context"));

        let context = "HISTORICAL CONTEXT (recent briefs, newest first):\n- [2025-03-01] Old story\n";
        let with = compose_prompt(&articles(1, 10), "payments", context, &PromptLimits::default());
        assert!(with.contains("- [2025-03-01] Old story"));
        assert!(with.contains("Skip developments already reported"));
    }
}
