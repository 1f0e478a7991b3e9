use std::collections::BTreeMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDate;
use brief_core::{Article, ArticleStorage, Brief, BriefStorage, Result};
use tokio::sync::RwLock;
use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    briefs: BTreeMap<NaiveDate, Brief>,
}

impl MemoryStore {
    pub fn store_article(&mut self, article: &Article) {
        if let Some(existing) = self.articles.iter_mut().find(|a| a.url == article.url) {
            *existing = article.clone();
        } else {
            self.articles.push(article.clone());
        }
    }

    pub fn articles_for_day(&self, day: NaiveDate) -> Vec<Article> {
        let mut articles: Vec<Article> = self.articles
            .iter()
            .filter(|article| article.fetched_at.date_naive() == day)
            .cloned()
            .collect();
        articles.sort_by(|a, b| a.published_at.cmp(&b.published_at).then_with(|| a.url.cmp(&b.url)));
        articles
    }

    pub fn get_article(&self, url: &str) -> Option<Article> {
        self.articles.iter().find(|a| a.url == url).cloned()
    }

    pub fn store_brief(&mut self, brief: &Brief) {
        self.briefs.insert(brief.date, brief.clone());
    }

    pub fn recent_briefs(&self, before: NaiveDate, limit: usize) -> Vec<Brief> {
        self.briefs
            .range(..before)
            .rev()
            .take(limit)
            .map(|(_, brief)| brief.clone())
            .collect()
    }
}

/// Process-local storage; everything is lost on exit.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn store_article(&self, article: &Article) -> Result<()> {
        self.store.write().await.store_article(article);
        Ok(())
    }

    async fn articles_for_day(&self, day: NaiveDate) -> Result<Vec<Article>> {
        Ok(self.store.read().await.articles_for_day(day))
    }

    async fn get_article(&self, url: &str) -> Result<Option<Article>> {
        Ok(self.store.read().await.get_article(url))
    }
}

#[async_trait]
impl BriefStorage for MemoryStorage {
    async fn store_brief(&self, brief: &Brief) -> Result<()> {
        self.store.write().await.store_brief(brief);
        Ok(())
    }

    async fn get_brief(&self, date: NaiveDate) -> Result<Option<Brief>> {
        Ok(self.store.read().await.briefs.get(&date).cloned())
    }

    async fn recent_briefs(&self, before: NaiveDate, limit: usize) -> Result<Vec<Brief>> {
        Ok(self.store.read().await.recent_briefs(before, limit))
    }
}
