use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use stratum_application::{QueryCache, QueryKey, QueryValue};
use stratum_core::AppResult;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct QueryCacheEntry {
    value: QueryValue,
    expires_at: Instant,
}

/// In-memory cache adapter for backend query results.
#[derive(Default)]
pub struct InMemoryQueryCache {
    entries: RwLock<HashMap<QueryKey, QueryCacheEntry>>,
}

impl InMemoryQueryCache {
    /// Creates an empty in-memory query cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryCache for InMemoryQueryCache {
    async fn get(&self, key: &QueryKey) -> AppResult<Option<QueryValue>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.value.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn set(&self, key: QueryKey, value: QueryValue, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries
            .write()
            .await
            .insert(key, QueryCacheEntry { value, expires_at });

        Ok(())
    }

    async fn invalidate(&self, key: &QueryKey) -> AppResult<()> {
        if self.entries.write().await.remove(key).is_some() {
            debug!(key = ?key.segments(), "query cache entry invalidated");
        }

        Ok(())
    }
}
