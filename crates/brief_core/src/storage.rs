use async_trait::async_trait;
use chrono::NaiveDate;
use crate::types::{Article, Brief};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Store an article, replacing any previous copy with the same URL
    async fn store_article(&self, article: &Article) -> Result<()>;

    /// Articles fetched on the given UTC day, oldest publication first
    async fn articles_for_day(&self, day: NaiveDate) -> Result<Vec<Article>>;

    /// Look up a single article by URL
    async fn get_article(&self, url: &str) -> Result<Option<Article>>;
}

#[async_trait]
pub trait BriefStorage: Send + Sync {
    /// Store a brief, replacing any previous brief for the same date
    async fn store_brief(&self, brief: &Brief) -> Result<()>;

    async fn get_brief(&self, date: NaiveDate) -> Result<Option<Brief>>;

    /// Up to `limit` briefs dated strictly before `before`, newest first
    async fn recent_briefs(&self, before: NaiveDate, limit: usize) -> Result<Vec<Brief>>;
}

pub trait Storage: ArticleStorage + BriefStorage {}

impl<T: ArticleStorage + BriefStorage> Storage for T {}
