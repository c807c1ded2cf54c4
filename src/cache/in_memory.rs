//! In-memory key-value backend for testing
//!
//! This module provides an in-memory [`KvStore`] that can be used in place of
//! Redis during integration testing, eliminating the need for a real Redis
//! instance. SCAN semantics (cursor pages, glob MATCH) mirror Redis closely
//! enough for the invalidation paths to be exercised.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;

use crate::cache::store::KvStore;
use crate::error::{AppError, AppResult};

/// Entry in the in-memory cache with expiration
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Instant::now() >= exp).unwrap_or(false)
    }
}

/// Compile a Redis glob (`*`, `?`, `\x`) into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    Regex::new(&out)
}

/// In-memory key-value store for testing
///
/// Keys are kept ordered so SCAN cursors are stable offsets. Every command
/// can be switched to fail, simulating a cache outage after startup.
pub struct InMemoryStore {
    data: RwLock<BTreeMap<String, CacheEntry>>,
    failing: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent command fail (or recover)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Whether a live (non-expired) entry exists for `key`
    pub async fn contains(&self, key: &str) -> bool {
        let data = self.data.read().await;
        data.get(key).map(|e| !e.is_expired()).unwrap_or(false)
    }

    /// Live keys, in order
    pub async fn keys(&self) -> Vec<String> {
        let data = self.data.read().await;
        data.iter()
            .filter(|(_, e)| !e.is_expired())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Overwrite a raw value, bypassing serialization
    pub async fn put_raw(&self, key: &str, value: &str) {
        let mut data = self.data.write().await;
        data.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Clear all entries (useful for test isolation)
    pub async fn clear(&self) {
        let mut data = self.data.write().await;
        data.clear();
    }

    fn check_available(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::RedisError(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "simulated cache outage",
            ))));
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check_available()?;
        let data = self.data.read().await;
        match data.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> AppResult<()> {
        self.check_available()?;
        let expires_at = if ttl_seconds > 0 {
            Some(Instant::now() + Duration::from_secs(ttl_seconds))
        } else {
            None
        };

        let mut data = self.data.write().await;
        data.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> AppResult<()> {
        self.check_available()?;
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> AppResult<(u64, Vec<String>)> {
        self.check_available()?;
        let matcher = glob_to_regex(pattern)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("bad scan pattern: {}", e)))?;

        let data = self.data.read().await;
        let start = cursor as usize;
        let count = count.max(1);

        let page: Vec<&String> = data.keys().skip(start).take(count).collect();
        let next = if start + page.len() >= data.len() {
            0
        } else {
            (start + page.len()) as u64
        };

        let matched = page
            .into_iter()
            .filter(|k| matcher.is_match(k))
            .filter(|k| data.get(*k).map(|e| !e.is_expired()).unwrap_or(false))
            .cloned()
            .collect();

        Ok((next, matched))
    }

    async fn del_many(&self, keys: &[String]) -> AppResult<()> {
        self.check_available()?;
        let mut data = self.data.write().await;
        for key in keys {
            data.remove(key);
        }
        Ok(())
    }
}
