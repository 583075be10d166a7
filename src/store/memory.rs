//! In-memory store backend.
//!
//! A keyed map behind one async `RwLock`. Each operation holds the lock for
//! its full read-modify-write, so same-key races that the original design
//! left open (create-then-find, rename collisions) cannot interleave here.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::article::{Article, ArticlePatch};
use crate::normalize::normalize_key;
use crate::store::{ArticleStore, StoreError};

/// Article storage in a process-local map, keyed by normalized title.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Article>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Article>, StoreError> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn find_by_title(&self, raw_title: &str) -> Result<Option<Article>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&normalize_key(raw_title)).cloned())
    }

    async fn create(&self, title: &str, content: Option<&str>) -> Result<Article, StoreError> {
        let key = normalize_key(title);
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists { title: title.to_owned() });
        }
        let article = Article {
            title: title.to_owned(),
            content: content.map(str::to_owned),
        };
        records.insert(key, article.clone());
        Ok(article)
    }

    async fn replace(
        &self,
        raw_title: &str,
        new_title: &str,
        new_content: Option<&str>,
    ) -> Result<Option<Article>, StoreError> {
        let old_key = normalize_key(raw_title);
        let new_key = normalize_key(new_title);
        let mut records = self.records.write().await;
        if !records.contains_key(&old_key) {
            return Ok(None);
        }
        if new_key != old_key && records.contains_key(&new_key) {
            return Err(StoreError::AlreadyExists { title: new_title.to_owned() });
        }
        records.remove(&old_key);
        let article = Article {
            title: new_title.to_owned(),
            content: new_content.map(str::to_owned),
        };
        records.insert(new_key, article.clone());
        Ok(Some(article))
    }

    async fn patch(
        &self,
        raw_title: &str,
        patch: ArticlePatch,
    ) -> Result<Option<Article>, StoreError> {
        let old_key = normalize_key(raw_title);
        let mut records = self.records.write().await;
        let Some(current) = records.get(&old_key).cloned() else {
            return Ok(None);
        };

        let mut updated = current;
        if let Some(content) = patch.content {
            updated.content = Some(content);
        }
        if let Some(title) = patch.title {
            let new_key = normalize_key(&title);
            if new_key != old_key && records.contains_key(&new_key) {
                return Err(StoreError::AlreadyExists { title });
            }
            updated.title = title;
            records.remove(&old_key);
            records.insert(new_key, updated.clone());
        } else {
            records.insert(old_key, updated.clone());
        }
        Ok(Some(updated))
    }

    async fn delete_one(&self, raw_title: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(&normalize_key(raw_title)).is_some())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let count = records.len() as u64;
        records.clear();
        Ok(count)
    }
}
