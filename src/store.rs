//! Content/source model and the repository seam the engine reads and writes through.
//!
//! `InMemoryRepository` is the default backing store; it can be seeded from a
//! JSON dataset of the shape `{ "sources": [...], "content": [...] }`.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub source_id: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub reads: u64,
    pub published_at: DateTime<Utc>,
    /// Derived; recomputed every cycle.
    #[serde(default)]
    pub heat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    /// Derived; sum of the source's item heat.
    #[serde(default)]
    pub heat: f64,
}

#[async_trait::async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_all_content(&self) -> Result<Vec<ContentItem>>;
    async fn list_all_sources(&self) -> Result<Vec<Source>>;
    /// Persist the derived `heat` of an existing item. Other fields of `item`
    /// may be stale (read at sweep start) and must not overwrite stored ones.
    async fn save_content(&self, item: &ContentItem) -> Result<()>;
    /// Persist the derived `heat` of an existing source.
    async fn save_source(&self, source: &Source) -> Result<()>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// Vec-backed repository; keeps insertion order for stable ranking ties.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<Dataset>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(sources: Vec<Source>, content: Vec<ContentItem>) -> Self {
        Self {
            inner: RwLock::new(Dataset { sources, content }),
        }
    }

    /// Seed from a JSON dataset file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset from {}", path.display()))?;
        let data: Dataset = serde_json::from_str(&raw)
            .with_context(|| format!("parsing dataset {}", path.display()))?;
        Ok(Self {
            inner: RwLock::new(data),
        })
    }

    /// Insert or replace by id (ingestion helper for wiring and tests).
    pub fn upsert_content(&self, item: ContentItem) {
        let mut d = self.inner.write().expect("repository lock poisoned");
        match d.content.iter_mut().find(|c| c.id == item.id) {
            Some(slot) => *slot = item,
            None => d.content.push(item),
        }
    }

    pub fn content(&self, id: &str) -> Option<ContentItem> {
        let d = self.inner.read().expect("repository lock poisoned");
        d.content.iter().find(|c| c.id == id).cloned()
    }

    pub fn source(&self, id: &str) -> Option<Source> {
        let d = self.inner.read().expect("repository lock poisoned");
        d.sources.iter().find(|s| s.id == id).cloned()
    }
}

#[async_trait::async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_all_content(&self) -> Result<Vec<ContentItem>> {
        Ok(self.inner.read().expect("repository lock poisoned").content.clone())
    }

    async fn list_all_sources(&self) -> Result<Vec<Source>> {
        Ok(self.inner.read().expect("repository lock poisoned").sources.clone())
    }

    async fn save_content(&self, item: &ContentItem) -> Result<()> {
        let mut d = self.inner.write().expect("repository lock poisoned");
        let slot = d
            .content
            .iter_mut()
            .find(|c| c.id == item.id)
            .ok_or_else(|| anyhow!("content '{}' not found", item.id))?;
        slot.heat = item.heat;
        Ok(())
    }

    async fn save_source(&self, source: &Source) -> Result<()> {
        let mut d = self.inner.write().expect("repository lock poisoned");
        let slot = d
            .sources
            .iter_mut()
            .find(|s| s.id == source.id)
            .ok_or_else(|| anyhow!("source '{}' not found", source.id))?;
        slot.heat = source.heat;
        Ok(())
    }
}
