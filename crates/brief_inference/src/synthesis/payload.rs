use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use brief_core::{Development, Resolution, SourceReference};
use super::SynthesisError;

/// The model's brief after shape validation, before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct BriefPayload {
    pub executive_summary: String,
    pub developments: Vec<Development>,
    pub sentiment_summary: String,
    pub trends: String,
    pub what_to_watch: String,
}

#[derive(Deserialize)]
struct RawDevelopment {
    #[serde(default, alias = "title")]
    headline: String,
    #[serde(default, alias = "key_takeaways")]
    takeaways: Option<RawTakeaways>,
    #[serde(default)]
    sources: Vec<RawSource>,
}

/// Models sometimes answer a single takeaway as a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTakeaways {
    One(String),
    Many(Vec<String>),
}

impl From<RawTakeaways> for Vec<String> {
    fn from(raw: RawTakeaways) -> Self {
        match raw {
            RawTakeaways::One(takeaway) => vec![takeaway],
            RawTakeaways::Many(takeaways) => takeaways,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSource {
    Url(String),
    Detailed {
        #[serde(default)]
        title: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        source: String,
    },
}

impl From<RawSource> for SourceReference {
    fn from(raw: RawSource) -> Self {
        let (title, url, source) = match raw {
            RawSource::Url(url) => (String::new(), url, String::new()),
            RawSource::Detailed { title, url, source } => (title, url, source),
        };
        SourceReference {
            title: title.trim().to_string(),
            url: url.trim().to_string(),
            source: source.trim().to_string(),
            resolution: Resolution::Provided,
        }
    }
}

/// First string value among `keys`; arrays of strings are joined.
fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        _ => None,
    })
}

/// Lowercase alphanumerics separated by single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the words of `key` appear as a contiguous run in `words`.
fn restates(words: &[&str], key: &str) -> bool {
    let key: Vec<&str> = key.split(' ').collect();
    key.len() <= words.len() && words.windows(key.len()).any(|window| window == key.as_slice())
}

/// Drop empty takeaways, duplicates, and ones that restate the headline.
pub fn distinct_takeaways(headline: &str, takeaways: Vec<String>) -> Vec<String> {
    let headline = normalize(headline);
    let headline_words: Vec<&str> = headline.split_whitespace().collect();
    let mut seen: Vec<String> = Vec::new();
    let mut kept = Vec::new();
    for takeaway in takeaways {
        let key = normalize(&takeaway);
        if key.is_empty() || restates(&headline_words, &key) || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        kept.push(takeaway.trim().to_string());
    }
    kept
}

impl BriefPayload {
    /// Validate the top-level shape and normalize developments. At most
    /// `max_developments` are kept.
    pub fn from_value(value: Value, max_developments: usize) -> Result<Self, SynthesisError> {
        let Value::Object(object) = value else {
            return Err(SynthesisError::Shape("response is not a JSON object".to_string()));
        };

        let executive_summary = match object.get("executive_summary") {
            Some(Value::String(summary)) => summary.trim().to_string(),
            Some(_) => return Err(SynthesisError::Shape("executive_summary is not a string".to_string())),
            None => return Err(SynthesisError::Shape("missing executive_summary".to_string())),
        };

        let raw_developments = match object.get("developments") {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(SynthesisError::Shape("developments is not an array".to_string())),
            None => return Err(SynthesisError::Shape("missing developments".to_string())),
        };

        let raw_developments_empty = raw_developments.is_empty();
        let mut developments = Vec::new();
        for item in raw_developments {
            let raw: RawDevelopment = match serde_json::from_value(item) {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("Skipping malformed development: {}", e);
                    continue;
                }
            };
            let headline = raw.headline.trim().to_string();
            if headline.is_empty() {
                debug!("Skipping development without a headline");
                continue;
            }
            developments.push(Development {
                takeaways: distinct_takeaways(&headline, raw.takeaways.map(Vec::from).unwrap_or_default()),
                sources: raw.sources.into_iter().map(SourceReference::from).collect(),
                headline,
            });
        }
        if developments.is_empty() && !raw_developments_empty {
            return Err(SynthesisError::Shape("no development has a usable shape".to_string()));
        }
        if developments.len() > max_developments {
            debug!("Keeping {} of {} developments", max_developments, developments.len());
            developments.truncate(max_developments);
        }

        Ok(Self {
            executive_summary,
            developments,
            sentiment_summary: text_field(&object, &["sentiment_summary", "sentiment"]).unwrap_or_default(),
            trends: text_field(&object, &["trends", "trend"]).unwrap_or_default(),
            what_to_watch: text_field(&object, &["what_to_watch", "watch"]).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_required_fields_is_shape_error() {
        let missing_summary = json!({"developments": []});
        assert!(matches!(BriefPayload::from_value(missing_summary, 5), Err(SynthesisError::Shape(_))));

        let missing_developments = json!({"executive_summary": "x"});
        assert!(matches!(BriefPayload::from_value(missing_developments, 5), Err(SynthesisError::Shape(_))));

        let wrong_type = json!({"executive_summary": "x", "developments": "none"});
        assert!(matches!(BriefPayload::from_value(wrong_type, 5), Err(SynthesisError::Shape(_))));

        assert!(matches!(BriefPayload::from_value(json!([1, 2]), 5), Err(SynthesisError::Shape(_))));
    }

    #[test]
    fn test_optional_fields_default_and_aliases() {
        let payload = BriefPayload::from_value(
            json!({"executive_summary": " calm day ", "developments": [], "sentiment": "upbeat"}),
            5,
        )
        .unwrap();
        assert_eq!(payload.executive_summary, "calm day");
        assert_eq!(payload.sentiment_summary, "upbeat");
        assert!(payload.trends.is_empty());
        assert!(payload.what_to_watch.is_empty());
    }

    #[test]
    fn test_sources_accept_strings_and_objects() {
        let payload = BriefPayload::from_value(
            json!({
                "executive_summary": "x",
                "developments": [{
                    "headline": "Visa launches agent toolkit",
                    "sources": ["https://x.com/a", {"title": "Visa Launches Agent Toolkit", "url": "x.com"}]
                }]
            }),
            5,
        )
        .unwrap();
        let sources = &payload.developments[0].sources;
        assert_eq!(sources[0].url, "https://x.com/a");
        assert!(sources[0].title.is_empty());
        assert_eq!(sources[1].title, "Visa Launches Agent Toolkit");
        assert_eq!(sources[1].url, "x.com");
    }

    #[test]
    fn test_developments_filtered_and_capped() {
        let developments: Vec<Value> = (0..8)
            .map(|i| json!({"headline": format!("Story {}", i)}))
            .chain([json!({"headline": "  "}), json!("not an object")])
            .collect();
        let payload = BriefPayload::from_value(
            json!({"executive_summary": "x", "developments": developments}),
            5,
        )
        .unwrap();
        assert_eq!(payload.developments.len(), 5);
        assert_eq!(payload.developments[4].headline, "Story 4");
    }

    #[test]
    fn test_restated_takeaways_are_dropped() {
        let kept = distinct_takeaways(
            "Visa launches agent toolkit",
            vec![
                "Visa launches agent toolkit.".to_string(),
                "agent toolkit".to_string(),
                "Toolkit ships to 40 issuers first".to_string(),
                "toolkit ships to 40 issuers first!".to_string(),
                "".to_string(),
            ],
        );
        assert_eq!(kept, vec!["Toolkit ships to 40 issuers first".to_string()]);
    }

    #[test]
    fn test_takeaway_words_inside_headline_words_are_kept() {
        let kept = distinct_takeaways(
            "Banks chain stablecoin rails",
            vec!["AI".to_string(), "ail".to_string(), "stablecoin rails".to_string()],
        );
        assert_eq!(kept, vec!["AI".to_string(), "ail".to_string()]);
    }

    #[test]
    fn test_non_ascii_capitals_match() {
        let kept = distinct_takeaways(
            "Nouvelle émission de stablecoins",
            vec!["Émission".to_string(), "ÉMISSION de stablecoins".to_string(), "Öffnung".to_string()],
        );
        assert_eq!(kept, vec!["Öffnung".to_string()]);
    }

    #[test]
    fn test_single_string_takeaway_is_one_item() {
        let payload = BriefPayload::from_value(
            json!({
                "executive_summary": "s",
                "developments": [{
                    "headline": "Visa toolkit",
                    "takeaways": "Ships to 40 issuers",
                    "sources": [{"title": "Visa Launches Agent Toolkit", "url": "x.com"}]
                }]
            }),
            5,
        )
        .unwrap();
        assert_eq!(payload.developments.len(), 1);
        assert_eq!(payload.developments[0].takeaways, vec!["Ships to 40 issuers".to_string()]);

        let null_takeaways = BriefPayload::from_value(
            json!({"executive_summary": "s", "developments": [{"headline": "x", "takeaways": null}]}),
            5,
        )
        .unwrap();
        assert!(null_takeaways.developments[0].takeaways.is_empty());
    }

    #[test]
    fn test_numeric_headline_skips_that_development() {
        let payload = BriefPayload::from_value(
            json!({
                "executive_summary": "s",
                "developments": [{"headline": 42}, {"headline": "Stripe expands"}]
            }),
            5,
        )
        .unwrap();
        assert_eq!(payload.developments.len(), 1);
        assert_eq!(payload.developments[0].headline, "Stripe expands");
    }

    #[test]
    fn test_no_usable_development_is_shape_error() {
        let all_malformed = json!({
            "executive_summary": "s",
            "developments": [{"headline": 42}, {"headline": "  "}, {"takeaways": {"a": 1}, "headline": "x"}]
        });
        assert!(matches!(BriefPayload::from_value(all_malformed, 5), Err(SynthesisError::Shape(_))));

        // An explicitly empty list is a quiet day, not a malformed answer
        let quiet = BriefPayload::from_value(json!({"executive_summary": "s", "developments": []}), 5).unwrap();
        assert!(quiet.developments.is_empty());
    }
}
