use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use nn_core::{Article, Error, NewSummary, RecordStore, Result, Settings, SummaryRecord};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        url TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        publish_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS summaries (
        article_url TEXT PRIMARY KEY,
        summary TEXT NOT NULL,
        audio_path TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (article_url) REFERENCES articles(url)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_date ON articles(publish_date)",
    "CREATE INDEX IF NOT EXISTS idx_summaries_created ON summaries(created_at)",
];

/// SQLite-backed [`RecordStore`]. Timestamps are stored as RFC3339 UTC text,
/// settings as one row per field with JSON-encoded values.
pub struct SqliteStore {
    pool: SqlitePool,
}

fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let raw: String = row.get("publish_date");
    let publish_date = DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| Error::Store(format!("invalid publish_date {:?}: {}", raw, e)))?
        .with_timezone(&Utc);
    Ok(Article {
        url: row.get("url"),
        title: row.get("title"),
        content: row.get("content"),
        publish_date,
    })
}

impl SqliteStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(store_err)?;

        for migration in MIGRATIONS {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(store_err)?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn upsert_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO articles (url, title, content, publish_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.publish_date.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn upsert_summary(&self, url: &str, summary: &NewSummary) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let article = sqlx::query("SELECT 1 FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;
        if article.is_none() {
            return Err(Error::MissingArticle(url.to_string()));
        }

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO summaries (article_url, summary, audio_path, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(url)
        .bind(&summary.summary)
        .bind(&summary.audio_path)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn get_articles(&self, filter_date: Option<NaiveDate>) -> Result<Vec<Article>> {
        let rows = match filter_date {
            Some(day) => {
                sqlx::query(
                    r#"
                    SELECT url, title, content, publish_date FROM articles
                    WHERE DATE(publish_date) = ?
                    ORDER BY publish_date DESC
                    "#,
                )
                .bind(day.format("%Y-%m-%d").to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT url, title, content, publish_date FROM articles ORDER BY publish_date DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(store_err)?;

        rows.iter().map(article_from_row).collect()
    }

    async fn get_summaries(&self) -> Result<Vec<SummaryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                a.url, a.title, a.content, a.publish_date,
                s.summary, s.audio_path, s.created_at
            FROM articles a
            JOIN summaries s ON a.url = s.article_url
            ORDER BY a.publish_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                let raw: String = row.get("created_at");
                let created_at = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| Error::Store(format!("invalid created_at {:?}: {}", raw, e)))?
                    .with_timezone(&Utc);
                Ok(SummaryRecord {
                    article: article_from_row(row)?,
                    summary: row.get("summary"),
                    audio_path: row.get("audio_path"),
                    created_at,
                })
            })
            .collect()
    }

    async fn existing_urls(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT url FROM articles")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(|row| row.get("url")).collect())
    }

    async fn unsummarized_articles(&self) -> Result<Vec<Article>> {
        // rowid keeps discovery order, matching the pipeline's processing order.
        let rows = sqlx::query(
            r#"
            SELECT a.url, a.title, a.content, a.publish_date
            FROM articles a
            LEFT JOIN summaries s ON a.url = s.article_url
            WHERE s.article_url IS NULL
            ORDER BY a.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(article_from_row).collect()
    }

    async fn get_settings(&self) -> Result<Option<Settings>> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut map = serde_json::Map::new();
        for row in &rows {
            let key: String = row.get("key");
            let raw: String = row.get("value");
            map.insert(key, serde_json::from_str(&raw)?);
        }
        Ok(Some(serde_json::from_value(serde_json::Value::Object(
            map,
        ))?))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        let fields = value
            .as_object()
            .ok_or_else(|| Error::Store("settings did not serialize to an object".to_string()))?;

        let mut tx = self.pool.begin().await.map_err(store_err)?;
        sqlx::query("DELETE FROM settings")
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        for (key, field) in fields {
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(serde_json::to_string(field)?)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn ensure_default_settings(&self) -> Result<Settings> {
        match self.get_settings().await? {
            Some(settings) => Ok(settings),
            None => {
                let defaults = Settings::default();
                self.save_settings(&defaults).await?;
                tracing::info!("default settings initialized in database");
                Ok(defaults)
            }
        }
    }
}
