use std::path::{Path, PathBuf};
use std::str::FromStr;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use brief_core::{Article, ArticleStorage, Brief, BriefStorage, Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use crate::StorageBackend;

const DEFAULT_DB_PATH: &str = "briefs.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        url TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        source TEXT NOT NULL,
        topic TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        published_at TEXT NOT NULL,
        fetched_at TEXT NOT NULL,
        fetched_day TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_articles_fetched_day ON articles (fetched_day)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS briefs (
        date TEXT PRIMARY KEY,
        is_fallback INTEGER NOT NULL,
        generated_at TEXT NOT NULL,
        payload TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::InvalidDate(format!("{}: {}", raw, e)))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        url: row.get("url"),
        title: row.get("title"),
        source: row.get("source"),
        topic: row.get("topic"),
        content: row.get("content"),
        published_at: parse_timestamp(row.get("published_at"))?,
        fetched_at: parse_timestamp(row.get("fetched_at"))?,
    })
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./briefs.db"
    }

    async fn open(url: Option<&str>) -> Result<Self> {
        let path = url
            .map(|u| u.trim_start_matches("sqlite://").trim_start_matches("sqlite:"))
            .unwrap_or(DEFAULT_DB_PATH);
        Self::new_with_path(Path::new(path)).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(db_error("Invalid database path"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn store_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO articles
            (url, title, source, topic, content, published_at, fetched_at, fetched_day)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.source)
        .bind(&article.topic)
        .bind(&article.content)
        .bind(timestamp(&article.published_at))
        .bind(timestamp(&article.fetched_at))
        .bind(article.fetched_at.date_naive().to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to store article"))?;
        Ok(())
    }

    async fn articles_for_day(&self, day: NaiveDate) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE fetched_day = ?
            ORDER BY published_at ASC, url ASC
            "#,
        )
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load articles"))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn get_article(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load article"))?;
        row.as_ref().map(article_from_row).transpose()
    }
}

#[async_trait]
impl BriefStorage for SQLiteStorage {
    async fn store_brief(&self, brief: &Brief) -> Result<()> {
        let payload = serde_json::to_string(brief)?;
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO briefs (date, is_fallback, generated_at, payload)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(brief.date.to_string())
        .bind(brief.is_fallback)
        .bind(timestamp(&brief.generated_at))
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to store brief"))?;
        Ok(())
    }

    async fn get_brief(&self, date: NaiveDate) -> Result<Option<Brief>> {
        let payload: Option<String> = sqlx::query_scalar("SELECT payload FROM briefs WHERE date = ?")
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load brief"))?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(Error::from))
            .transpose()
    }

    async fn recent_briefs(&self, before: NaiveDate, limit: usize) -> Result<Vec<Brief>> {
        let payloads: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT payload FROM briefs
            WHERE date < ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(before.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load recent briefs"))?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn brief(date: NaiveDate) -> Brief {
        Brief {
            date,
            domain: "payments".to_string(),
            executive_summary: format!("Brief for {}", date),
            developments: vec![],
            sentiment_summary: "Neutral".to_string(),
            trends: String::new(),
            what_to_watch: String::new(),
            article_count: 0,
            is_fallback: false,
            fallback_reason: None,
            raw_response: "{}".to_string(),
            gaps: vec![],
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();
        assert_eq!(storage.get_db_path(), db_path.as_path());

        let day = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let mut article = Article::new("https://x.com/a", "Visa Launches Agent Toolkit", "x.com")
            .with_content("Body")
            .fetched_on(day);
        article.published_at = day - Duration::hours(2);
        storage.store_article(&article).await.unwrap();
        storage.store_article(&article).await.unwrap();

        let articles = storage.articles_for_day(day.date_naive()).await.unwrap();
        assert_eq!(articles, vec![article.clone()]);
        assert!(storage.articles_for_day(day.date_naive() - Duration::days(1)).await.unwrap().is_empty());
        assert_eq!(storage.get_article("https://x.com/a").await.unwrap(), Some(article));

        let today = day.date_naive();
        for days_ago in 0..4 {
            storage.store_brief(&brief(today - Duration::days(days_ago))).await.unwrap();
        }
        let recent = storage.recent_briefs(today, 2).await.unwrap();
        assert_eq!(recent.iter().map(|b| b.date).collect::<Vec<_>>(), vec![
            today - Duration::days(1),
            today - Duration::days(2),
        ]);
        assert_eq!(storage.get_brief(today).await.unwrap().unwrap().raw_response, "{}");
        assert!(storage.get_brief(today + Duration::days(1)).await.unwrap().is_none());
    }
}
