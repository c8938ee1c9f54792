//! Keyed cache for repository file contents and directory listings

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::Result;
use crate::github::types::RepoContents;

/// Identity of a cached path: repository name plus path within it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub repository: String,
    pub path: String,
}

impl ContentKey {
    pub fn new(repository: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repository, self.path)
    }
}

/// Insert-only map of fetched contents
///
/// Entries never expire; they live as long as the cache. Failed fetches are
/// not stored, so the next request for the key retries.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: RwLock<HashMap<ContentKey, Arc<RepoContents>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &ContentKey) -> Option<Arc<RepoContents>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Return the cached entry for `key`, running `fetch` on a miss
    pub async fn get_or_fetch<Fut>(
        &self,
        key: &ContentKey,
        fetch: impl FnOnce() -> Fut,
    ) -> Result<Arc<RepoContents>>
    where
        Fut: Future<Output = Result<RepoContents>>,
    {
        if let Some(hit) = self.get(key).await {
            tracing::debug!("Content cache hit for {}", key);
            return Ok(hit);
        }

        tracing::debug!("Content cache miss for {}, fetching", key);
        let fetched = Arc::new(fetch().await?);

        // First writer wins if two requests raced on the same key
        let mut entries = self.entries.write().await;
        let stored = entries.entry(key.clone()).or_insert(fetched);
        Ok(stored.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
