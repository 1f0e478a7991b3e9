//! Grounds model-claimed sources in the articles the model was shown.
//!
//! Each reference runs through an ordered chain of matchers; the first one
//! that finds an article wins. A reference nothing matches stays in place,
//! flagged unresolved, and is reported as a gap. URLs are never invented.

use tracing::warn;
use brief_core::{Article, Development, ReconciliationGap, Resolution, SourceReference};

type Matcher = for<'a> fn(&SourceReference, &'a [Article]) -> Option<&'a Article>;

/// Matchers after the absolute-URL check, in priority order.
const MATCHERS: [(Resolution, Matcher); 3] = [
    (Resolution::ExactTitle, match_exact_title),
    (Resolution::TitleFragment, match_title_fragment),
    (Resolution::Domain, match_domain),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub developments: Vec<Development>,
    pub gaps: Vec<ReconciliationGap>,
}

pub fn has_absolute_url(reference: &SourceReference) -> bool {
    reference.url.starts_with("http://") || reference.url.starts_with("https://")
}

pub fn match_exact_title<'a>(reference: &SourceReference, articles: &'a [Article]) -> Option<&'a Article> {
    let title = reference.title.trim().to_lowercase();
    if title.is_empty() {
        return None;
    }
    articles
        .iter()
        .find(|article| article.title.trim().to_lowercase() == title)
}

pub fn match_title_fragment<'a>(reference: &SourceReference, articles: &'a [Article]) -> Option<&'a Article> {
    let title = reference.title.trim().to_lowercase();
    if title.is_empty() {
        return None;
    }
    articles.iter().find(|article| {
        let candidate = article.title.trim().to_lowercase();
        !candidate.is_empty() && (title.contains(&candidate) || candidate.contains(&title))
    })
}

/// The partial URL or bare domain a reference carries, lowercased and
/// without a leading `www.`.
fn domain_fragment(reference: &SourceReference) -> Option<String> {
    let raw = if reference.url.trim().is_empty() {
        reference.source.trim()
    } else {
        reference.url.trim()
    };
    let lowered = raw.trim_end_matches('/').to_lowercase();
    let fragment = lowered.strip_prefix("www.").unwrap_or(&lowered);
    (!fragment.is_empty()).then(|| fragment.to_string())
}

pub fn match_domain<'a>(reference: &SourceReference, articles: &'a [Article]) -> Option<&'a Article> {
    let fragment = domain_fragment(reference)?;
    articles.iter().find(|article| {
        article.url.to_lowercase().contains(&fragment) || article.source.to_lowercase().contains(&fragment)
    })
}

/// Resolve one reference. `None` means no rule matched.
pub fn resolve_reference(reference: &SourceReference, articles: &[Article]) -> Option<SourceReference> {
    if has_absolute_url(reference) {
        return Some(reference.clone());
    }
    MATCHERS.iter().find_map(|(resolution, matcher)| {
        matcher(reference, articles).map(|article| SourceReference {
            title: reference.title.clone(),
            url: article.url.clone(),
            source: article.source.clone(),
            resolution: *resolution,
        })
    })
}

/// Reconcile every source of every development against `articles`.
/// Developments the model left without sources get one for the first
/// article.
pub fn reconcile(developments: Vec<Development>, articles: &[Article]) -> Reconciled {
    let mut gaps = Vec::new();
    let developments = developments
        .into_iter()
        .map(|development| {
            let mut sources: Vec<SourceReference> = development
                .sources
                .iter()
                .map(|reference| {
                    resolve_reference(reference, articles).unwrap_or_else(|| {
                        warn!(
                            "⚠️ Unresolved source {:?} ({:?}) in development {:?}",
                            reference.title, reference.url, development.headline
                        );
                        gaps.push(ReconciliationGap {
                            headline: development.headline.clone(),
                            claimed_title: reference.title.clone(),
                            claimed_url: reference.url.clone(),
                        });
                        SourceReference {
                            resolution: Resolution::Unresolved,
                            ..reference.clone()
                        }
                    })
                })
                .collect();

            if sources.is_empty() {
                if let Some(first) = articles.first() {
                    sources.push(SourceReference::from_article(first, Resolution::Synthesized));
                }
            }

            Development { sources, ..development }
        })
        .collect();

    Reconciled { developments, gaps }
}
