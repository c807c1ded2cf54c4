//! Typed cache client
//!
//! Serializes values as JSON on top of a [`KvStore`] and applies the cache
//! policy: fixed TTL, bounded per-call timeouts, and cursor-driven pattern
//! invalidation.
//!
//! Failure handling differs by direction. A failed or timed-out read is a
//! miss (the caller goes to the authoritative store); a failed delete is an
//! error, because swallowing it would leave stale data visible for a full TTL.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use crate::cache::keys::PROBE_KEY;
use crate::cache::store::KvStore;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::routes::metrics::record_cache_operation;

/// Cache policy knobs
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Expiry applied to every entry
    pub ttl_seconds: u64,
    /// Upper bound on any single backend call
    pub op_timeout: Duration,
    /// SCAN page size during pattern deletes
    pub scan_batch: usize,
}

impl CacheSettings {
    /// Build settings from application config
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl_seconds: config.cache_ttl_seconds,
            op_timeout: Duration::from_millis(config.cache_timeout_ms),
            scan_batch: config.cache_scan_batch,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 30 * 60,
            op_timeout: Duration::from_millis(500),
            scan_batch: 100,
        }
    }
}

/// Typed cache client shared by every repository
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn KvStore>,
    settings: CacheSettings,
}

impl CacheClient {
    /// Wrap a backend without probing it
    pub fn new(store: Arc<dyn KvStore>, settings: CacheSettings) -> Self {
        Self { store, settings }
    }

    /// Wrap a backend and prove it round-trips a value
    ///
    /// Writes the probe key, reads it back and compares. Any failure here is
    /// meant to abort startup.
    pub async fn connect(store: Arc<dyn KvStore>, settings: CacheSettings) -> AppResult<Self> {
        let client = Self::new(store, settings);

        let marker = chrono::Utc::now().timestamp_millis().to_string();
        client
            .bounded(client.store.set_ex(PROBE_KEY, &marker, 60))
            .await?;
        let echoed = client.bounded(client.store.get(PROBE_KEY)).await?;

        if echoed.as_deref() != Some(marker.as_str()) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "cache probe did not round-trip on {}",
                client.store.name()
            )));
        }

        debug!(backend = client.store.name(), "Cache probe succeeded");
        Ok(client)
    }

    /// Backend name
    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Liveness check against the backend
    pub async fn ping(&self) -> AppResult<()> {
        self.bounded(self.store.ping()).await
    }

    /// Read and decode a value
    ///
    /// Returns `None` on absence, backend failure, timeout or undecodable
    /// payload. None of those are errors to the caller.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.bounded(self.store.get(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                record_cache_operation("get", "miss");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Cache read failed, treating as miss");
                record_cache_operation("get", "error");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                record_cache_operation("get", "hit");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, "Cached payload no longer decodes, treating as miss");
                record_cache_operation("get", "undecodable");
                None
            }
        }
    }

    /// Encode and store a value with the configured TTL
    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let serialized = serde_json::to_string(value)?;
        let result = self
            .bounded(self.store.set_ex(key, &serialized, self.settings.ttl_seconds))
            .await;
        record_cache_operation("set", if result.is_ok() { "ok" } else { "error" });
        result
    }

    /// Remove exactly one key
    #[instrument(skip(self))]
    pub async fn delete_exact(&self, key: &str) -> AppResult<()> {
        let result = self
            .bounded(self.store.del(key))
            .await
            .map_err(|e| invalidation_error(key, e));
        record_cache_operation("delete", if result.is_ok() { "ok" } else { "error" });
        result
    }

    /// Remove every key matching a glob pattern
    ///
    /// Walks the key space with SCAN pages of `scan_batch` until the cursor
    /// returns to zero, then deletes all matches in one command. Returns the
    /// number of keys removed.
    #[instrument(skip(self))]
    pub async fn delete_by_pattern(&self, pattern: &str) -> AppResult<usize> {
        let result = self.collect_and_delete(pattern).await;
        record_cache_operation("invalidate", if result.is_ok() { "ok" } else { "error" });
        result.map_err(|e| invalidation_error(pattern, e))
    }

    async fn collect_and_delete(&self, pattern: &str) -> AppResult<usize> {
        let mut matched = BTreeSet::new();
        let mut cursor = 0u64;

        loop {
            let (next, keys) = self
                .bounded(self.store.scan(cursor, pattern, self.settings.scan_batch))
                .await?;
            matched.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        if matched.is_empty() {
            debug!("No keys matched");
            return Ok(0);
        }

        let keys: Vec<String> = matched.into_iter().collect();
        self.bounded(self.store.del_many(&keys)).await?;
        debug!(removed = keys.len(), "Pattern invalidation complete");
        Ok(keys.len())
    }

    async fn bounded<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.settings.op_timeout, fut)
            .await
            .map_err(|_| AppError::CacheTimeout)?
    }
}

fn invalidation_error(key: &str, error: AppError) -> AppError {
    match error {
        AppError::CacheInvalidation { .. } => error,
        other => AppError::CacheInvalidation {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}
