//! SQLite store backend via sqlx.
//!
//! One table, one unique index on the normalized key. The unique constraint
//! is what turns the original design's insert-then-find race into a clean
//! `AlreadyExists` error instead of silent duplicates.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Pool, Row, Sqlite};

use crate::article::{Article, ArticlePatch};
use crate::normalize::normalize_key;
use crate::store::{ArticleStore, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS articles (
    title     TEXT NOT NULL,
    title_key TEXT NOT NULL UNIQUE,
    content   TEXT
)";

/// Durable article storage in a SQLite database.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl FromRow<'_, SqliteRow> for Article {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            title: row.try_get("title")?,
            content: row.try_get("content")?,
        })
    }
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // SQLite allows one writer at a time; a single pooled connection
        // also keeps `sqlite::memory:` databases coherent across calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    fn map_write_err(err: sqlx::Error, title: &str) -> StoreError {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::AlreadyExists { title: title.to_owned() };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Article>, StoreError> {
        let articles = sqlx::query_as("SELECT title, content FROM articles")
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    async fn find_by_title(&self, raw_title: &str) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as("SELECT title, content FROM articles WHERE title_key = ?")
            .bind(normalize_key(raw_title))
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    async fn create(&self, title: &str, content: Option<&str>) -> Result<Article, StoreError> {
        let key = normalize_key(title);
        sqlx::query("INSERT INTO articles (title, title_key, content) VALUES (?, ?, ?)")
            .bind(title)
            .bind(&key)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_err(e, title))?;

        // Read the row back by its key so the caller gets what was actually
        // persisted, not an echo of the input.
        let article = sqlx::query_as("SELECT title, content FROM articles WHERE title_key = ?")
            .bind(&key)
            .fetch_one(&self.pool)
            .await?;
        Ok(article)
    }

    async fn replace(
        &self,
        raw_title: &str,
        new_title: &str,
        new_content: Option<&str>,
    ) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as(
            "UPDATE articles SET title = ?, title_key = ?, content = ?
             WHERE title_key = ? RETURNING title, content",
        )
        .bind(new_title)
        .bind(normalize_key(new_title))
        .bind(new_content)
        .bind(normalize_key(raw_title))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_err(e, new_title))?;
        Ok(article)
    }

    async fn patch(
        &self,
        raw_title: &str,
        patch: ArticlePatch,
    ) -> Result<Option<Article>, StoreError> {
        let key = normalize_key(raw_title);
        let article = match (patch.title, patch.content) {
            (Some(title), Some(content)) => sqlx::query_as(
                "UPDATE articles SET title = ?, title_key = ?, content = ?
                 WHERE title_key = ? RETURNING title, content",
            )
            .bind(&title)
            .bind(normalize_key(&title))
            .bind(content)
            .bind(&key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_err(e, &title))?,

            (Some(title), None) => sqlx::query_as(
                "UPDATE articles SET title = ?, title_key = ?
                 WHERE title_key = ? RETURNING title, content",
            )
            .bind(&title)
            .bind(normalize_key(&title))
            .bind(&key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_err(e, &title))?,

            (None, Some(content)) => sqlx::query_as(
                "UPDATE articles SET content = ?
                 WHERE title_key = ? RETURNING title, content",
            )
            .bind(content)
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?,

            (None, None) => {
                sqlx::query_as("SELECT title, content FROM articles WHERE title_key = ?")
                    .bind(&key)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(article)
    }

    async fn delete_one(&self, raw_title: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM articles WHERE title_key = ?")
            .bind(normalize_key(raw_title))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM articles").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
