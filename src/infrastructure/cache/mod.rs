use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CacheError;

pub mod redis_cache;

/// Raw key/value store behind the response cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Typed read-through cache. Every failure is logged and treated as a miss so
/// that a broken cache never fails a request.
#[derive(Clone, Default)]
pub struct ResponseCache {
    store: Option<Arc<dyn CacheStore>>,
}

impl ResponseCache {
    pub fn new(store: Option<Arc<dyn CacheStore>>) -> Self {
        ResponseCache { store }
    }

    pub fn disabled() -> Self {
        ResponseCache { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;

        match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = store.set(key, &raw, ttl).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    pub async fn invalidate(&self, keys: &[String]) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        if let Err(e) = store.delete(keys).await {
            tracing::warn!(?keys, error = %e, "cache invalidation failed");
        }
    }

    /// Returns the cached value or loads, stores and returns a fresh one
    pub async fn get_or_load<T, F, Fut, E>(&self, key: &str, ttl: Duration, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let fresh = load().await?;
        self.set(key, &fresh, ttl).await;
        Ok(fresh)
    }

    /// "OK", "Unavailable" or "Not configured", as reported by /health
    pub async fn status(&self) -> &'static str {
        match &self.store {
            Some(store) => match store.ping().await {
                Ok(()) => "OK",
                Err(e) => {
                    tracing::warn!(error = %e, "cache ping failed");
                    "Unavailable"
                }
            },
            None => "Not configured",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CacheStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.entries.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CacheError> {
            self.entries.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
            let mut entries = self.entries.lock();
            for key in keys {
                entries.remove(key);
            }
            Ok(())
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        async fn delete(&self, _keys: &[String]) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".into()))
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Err(CacheError::Connection("refused".into()))
        }
    }

    #[tokio::test]
    async fn loads_once_then_serves_from_cache() {
        let cache = ResponseCache::new(Some(Arc::new(MapStore::default())));
        let ttl = Duration::from_secs(60);

        let first: Result<Vec<i32>, ()> = cache.get_or_load("k", ttl, || async { Ok(vec![1, 2]) }).await;
        assert_eq!(first.unwrap(), vec![1, 2]);

        let second: Result<Vec<i32>, ()> = cache.get_or_load("k", ttl, || async { Ok(vec![9]) }).await;
        assert_eq!(second.unwrap(), vec![1, 2]);

        cache.invalidate(&["k".to_string()]).await;
        let third: Result<Vec<i32>, ()> = cache.get_or_load("k", ttl, || async { Ok(vec![9]) }).await;
        assert_eq!(third.unwrap(), vec![9]);
    }

    #[tokio::test]
    async fn broken_store_behaves_like_a_miss() {
        let cache = ResponseCache::new(Some(Arc::new(BrokenStore)));

        let value: Result<i32, ()> = cache
            .get_or_load("k", Duration::from_secs(1), || async { Ok(7) })
            .await;
        assert_eq!(value.unwrap(), 7);
        assert_eq!(cache.status().await, "Unavailable");
    }

    #[tokio::test]
    async fn disabled_cache_reports_not_configured() {
        let cache = ResponseCache::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.status().await, "Not configured");
        assert_eq!(cache.get::<i32>("k").await, None);
    }
}
