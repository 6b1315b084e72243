// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Short-TTL key-value cache.
//!
//! Backends implement [`Cache`]. Callers go through [`CacheClient`], which
//! (de)serializes JSON values and turns every backend failure into a miss or a
//! no-op.

pub mod memory;

pub use memory::MemoryCache;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Cache key names.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "strava:access_token";
    pub const LAST_SYNC: &str = "strava:last_sync";
    pub const LEADERBOARD: &str = "leaderboard:enriched";
    const STREAK_PREFIX: &str = "streak:";

    pub fn streak(athlete_id: u64) -> String {
        format!("{}{}", STREAK_PREFIX, athlete_id)
    }
}

/// Cache TTLs.
pub mod ttl {
    use std::time::Duration;

    /// Strava access tokens live 6 hours
    pub const ACCESS_TOKEN: Duration = Duration::from_secs(6 * 60 * 60);
    pub const LAST_SYNC: Duration = Duration::from_secs(5 * 60);
    pub const STREAK: Duration = Duration::from_secs(5 * 60);
    /// Matches the client polling interval
    pub const LEADERBOARD: Duration = Duration::from_secs(30);
}

/// Key-value store with per-entry expiry.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Errors a cache backend may report.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Typed, failure-tolerant front for a [`Cache`] backend.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn Cache>,
}

impl CacheClient {
    pub fn new(store: Arc<dyn Cache>) -> Self {
        Self { store }
    }

    /// Client over a fresh process-local store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Read and decode a value. Backend or decode failures count as a miss.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache get failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cached value undecodable, treating as miss");
                None
            }
        }
    }

    /// Encode and store a value with a TTL. Failures are logged and ignored.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode cache value");
                return;
            }
        };

        match self.store.set(key, raw, ttl) {
            Ok(()) => tracing::debug!(key, ttl_secs = ttl.as_secs(), "Cache set"),
            Err(e) => tracing::warn!(key, error = %e, "Cache set failed"),
        }
    }

    pub fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            tracing::warn!(key, error = %e, "Cache delete failed");
        }
    }

    /// Drop cached streaks for the given athletes (after a sync).
    pub fn invalidate_streaks(&self, athlete_ids: &[u64]) {
        for id in athlete_ids {
            self.delete(&keys::streak(*id));
        }
    }

    /// Drop the cached leaderboard response.
    pub fn invalidate_leaderboard(&self) {
        self.delete(keys::LEADERBOARD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every call, like an unreachable Redis.
    struct DownCache;

    impl Cache for DownCache {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
        fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_round_trips_typed_value() {
        let cache = CacheClient::in_memory();
        cache.set_json("k", &vec![1u32, 2, 3], Duration::from_secs(60));
        assert_eq!(cache.get_json::<Vec<u32>>("k"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_unavailable_backend_degrades_to_miss() {
        let cache = CacheClient::new(Arc::new(DownCache));
        cache.set_json("k", &42u32, Duration::from_secs(60));
        assert_eq!(cache.get_json::<u32>("k"), None);
        cache.delete("k");
        cache.invalidate_streaks(&[1, 2]);
    }

    #[test]
    fn test_wrong_type_is_a_miss() {
        let cache = CacheClient::in_memory();
        cache.set_json("k", &"not a number", Duration::from_secs(60));
        assert_eq!(cache.get_json::<u32>("k"), None);
    }

    #[test]
    fn test_invalidate_streaks_only_touches_named_athletes() {
        let cache = CacheClient::in_memory();
        cache.set_json(&keys::streak(1), &3u32, ttl::STREAK);
        cache.set_json(&keys::streak(2), &4u32, ttl::STREAK);

        cache.invalidate_streaks(&[1]);

        assert_eq!(cache.get_json::<u32>(&keys::streak(1)), None);
        assert_eq!(cache.get_json::<u32>(&keys::streak(2)), Some(4));
    }
}
