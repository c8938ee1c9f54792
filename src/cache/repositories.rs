//! Time-bounded cache for the organization's repository list

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::error::{LookupError, Result};
use crate::github::RemoteFetcher;
use crate::github::types::RepositoryRecord;

/// A complete repository list captured by one successful refresh
#[derive(Debug)]
pub struct CacheSnapshot {
    pub repositories: Vec<RepositoryRecord>,
    pub captured_at: DateTime<Utc>,
    fetched_at: Instant,
}

impl CacheSnapshot {
    fn new(repositories: Vec<RepositoryRecord>) -> Self {
        Self {
            repositories,
            captured_at: Utc::now(),
            fetched_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

/// Holds at most one snapshot and refreshes it once it outlives the TTL
///
/// Refreshes are single-flight: callers that find the snapshot stale queue on
/// a refresh gate and reuse whatever the caller ahead of them fetched.
#[derive(Debug)]
pub struct RepositoryCache {
    ttl: Duration,
    snapshot: RwLock<Option<Arc<CacheSnapshot>>>,
    refresh_gate: Mutex<()>,
}

impl RepositoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot without touching the network
    pub async fn snapshot(&self) -> Option<Arc<CacheSnapshot>> {
        self.snapshot.read().await.clone()
    }

    async fn fresh_snapshot(&self) -> Option<Arc<CacheSnapshot>> {
        self.snapshot()
            .await
            .filter(|snapshot| !snapshot.is_stale(self.ttl))
    }

    /// Return the repository list, refreshing it when forced, empty or stale
    ///
    /// A failed refresh falls back to the previous snapshot. Only when nothing
    /// was ever cached does the failure reach the caller, as `FetchFailed`.
    pub async fn get<F: RemoteFetcher>(
        &self,
        fetcher: &F,
        force_refresh: bool,
    ) -> Result<Arc<CacheSnapshot>> {
        if !force_refresh {
            if let Some(snapshot) = self.fresh_snapshot().await {
                tracing::debug!(
                    "Repository list cache hit ({} repositories, age {:?})",
                    snapshot.repositories.len(),
                    snapshot.age()
                );
                return Ok(snapshot);
            }
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone else may have refreshed while we waited on the gate
        if !force_refresh {
            if let Some(snapshot) = self.fresh_snapshot().await {
                tracing::debug!("Repository list refreshed by a concurrent request");
                return Ok(snapshot);
            }
        }

        tracing::info!("Refreshing repository list (forced: {})", force_refresh);
        match fetcher.list_repositories().await {
            Ok(repositories) => {
                let snapshot = Arc::new(CacheSnapshot::new(repositories));
                *self.snapshot.write().await = Some(snapshot.clone());
                tracing::info!(
                    "Cached {} repositories",
                    snapshot.repositories.len()
                );
                Ok(snapshot)
            }
            Err(e) => match self.snapshot().await {
                Some(previous) => {
                    tracing::warn!(
                        "Repository refresh failed, serving snapshot aged {:?}: {}",
                        previous.age(),
                        e
                    );
                    Ok(previous)
                }
                None => {
                    tracing::error!("Repository refresh failed with nothing cached: {}", e);
                    Err(LookupError::FetchFailed(format!(
                        "repository list unavailable: {e}"
                    )))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::mock::{MockFetcher, repository};

    const TTL: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn test_fresh_snapshot_is_reused() {
        let fetcher = MockFetcher::with_repositories(&["recipes", "parsnip"]);
        let cache = RepositoryCache::new(TTL);

        let first = cache.get(&fetcher, false).await.unwrap();
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        let second = cache.get(&fetcher, false).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.repo_calls(), 1);
        assert_eq!(second.repositories.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_snapshot_triggers_one_refresh() {
        let fetcher = MockFetcher::with_repositories(&["recipes"]);
        let cache = RepositoryCache::new(TTL);

        let first = cache.get(&fetcher, false).await.unwrap();
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        let second = cache.get(&fetcher, false).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.repo_calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_always_fetches() {
        let fetcher = MockFetcher::with_repositories(&["recipes"]);
        let cache = RepositoryCache::new(TTL);

        cache.get(&fetcher, false).await.unwrap();
        fetcher.set_repositories(Ok(vec![repository("recipes"), repository("tune")]));
        let refreshed = cache.get(&fetcher, true).await.unwrap();

        assert_eq!(fetcher.repo_calls(), 2);
        assert_eq!(refreshed.repositories.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_serves_previous_snapshot() {
        let fetcher = MockFetcher::with_repositories(&["recipes", "parsnip", "broom"]);
        let cache = RepositoryCache::new(TTL);

        let first = cache.get(&fetcher, false).await.unwrap();
        fetcher.set_repositories(Err(LookupError::FetchFailed("HTTP 503".into())));
        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        let second = cache.get(&fetcher, false).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.repositories.len(), 3);
        assert_eq!(fetcher.repo_calls(), 2);

        let forced = cache.get(&fetcher, true).await.unwrap();
        assert!(Arc::ptr_eq(&first, &forced));
    }

    #[tokio::test]
    async fn test_failed_refresh_without_snapshot_is_fatal() {
        let fetcher = MockFetcher::new();
        fetcher.set_repositories(Err(LookupError::NotFound("/orgs/nope/repos".into())));
        let cache = RepositoryCache::new(TTL);

        let err = cache.get(&fetcher, false).await.unwrap_err();
        assert!(matches!(err, LookupError::FetchFailed(_)), "{err:?}");
        assert!(cache.snapshot().await.is_none());

        // Nothing was cached, so the next call tries again
        fetcher.set_repositories(Ok(vec![repository("recipes")]));
        assert!(cache.get(&fetcher, false).await.is_ok());
        assert_eq!(fetcher.repo_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_stale_reads_share_one_refresh() {
        let fetcher = MockFetcher::with_repositories(&["recipes"]);
        fetcher.set_repo_delay(Duration::from_millis(200));
        let cache = RepositoryCache::new(TTL);

        let (a, b, c) = tokio::join!(
            cache.get(&fetcher, false),
            cache.get(&fetcher, false),
            cache.get(&fetcher, false)
        );

        assert_eq!(fetcher.repo_calls(), 1);
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }
}
