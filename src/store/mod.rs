//! Keyed article storage.
//!
//! One trait, two backends. [`SqliteStore`](sqlite::SqliteStore) is the
//! durable backend for real deployments; [`MemoryStore`](memory::MemoryStore)
//! backs tests and ephemeral runs. Handlers hold the store as
//! `Arc<dyn ArticleStore>` and never know which one they are talking to.
//!
//! Every lookup-by-title operation normalizes the raw title itself, so
//! callers can pass whatever casing the request carried.

use async_trait::async_trait;
use thiserror::Error;

use crate::article::{Article, ArticlePatch};

pub mod memory;
pub mod sqlite;

/// A failed storage operation.
///
/// Operations are single reads or writes; there is nothing to retry or roll
/// back here. `AlreadyExists` is distinct so callers can report a duplicate
/// title instead of a generic backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an article with that title already exists: \"{title}\"")]
    AlreadyExists { title: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Article storage keyed by normalized title.
///
/// Find/replace/patch/delete-one return `Ok(None)` (or `Ok(false)`) when no
/// record matches — absence is not an error. Replace and patch never upsert.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Cheap backend liveness check, used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// All stored articles, projected to `title`/`content`. No ordering
    /// guarantee.
    async fn list_all(&self) -> Result<Vec<Article>, StoreError>;

    /// Looks up one article by any casing variant of its title.
    async fn find_by_title(&self, raw_title: &str) -> Result<Option<Article>, StoreError>;

    /// Inserts a new article and reads back the persisted record.
    ///
    /// A second article whose title normalizes to an existing key is
    /// rejected with [`StoreError::AlreadyExists`].
    async fn create(&self, title: &str, content: Option<&str>) -> Result<Article, StoreError>;

    /// Overwrites title, key, and content of the record matching
    /// `raw_title`. Renaming onto another record's key is `AlreadyExists`.
    async fn replace(
        &self,
        raw_title: &str,
        new_title: &str,
        new_content: Option<&str>,
    ) -> Result<Option<Article>, StoreError>;

    /// Writes only the fields present in `patch`. An empty patch leaves the
    /// record untouched but still returns it.
    async fn patch(
        &self,
        raw_title: &str,
        patch: ArticlePatch,
    ) -> Result<Option<Article>, StoreError>;

    /// Removes the record matching `raw_title`. Returns whether one existed.
    async fn delete_one(&self, raw_title: &str) -> Result<bool, StoreError>;

    /// Removes every record. Returns how many were deleted.
    async fn delete_all(&self) -> Result<u64, StoreError>;
}
