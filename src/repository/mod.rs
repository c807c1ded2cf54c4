//! Cache-aside repositories
//!
//! Each repository pairs an authoritative store with the shared cache
//! client. Reads go cache → store → populate; writes go store → invalidate,
//! and the invalidation finishes before the call returns.

pub mod account;
pub mod product;

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheClient;
use crate::error::{AppError, AppResult};

pub use self::account::AccountRepository;
pub use self::product::ProductRepository;

/// Read `key` through the cache
///
/// On a hit the store is not touched. On a miss `fetch` runs; `Some` is
/// written back with the cache TTL before being returned, `None` becomes
/// `NotFound(resource)` and is never cached. A failed write-back is logged
/// and otherwise ignored. Concurrent misses may each reach the store.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &CacheClient,
    key: &str,
    resource: &str,
    fetch: F,
) -> AppResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<Option<T>>>,
{
    if let Some(hit) = cache.get::<T>(key).await {
        debug!(key = %key, "Cache hit");
        return Ok(hit);
    }

    debug!(key = %key, "Cache miss, querying store");
    let value = fetch().await?.ok_or_else(|| AppError::not_found(resource))?;

    if let Err(e) = cache.set(key, &value).await {
        warn!(key = %key, error = %e, "Failed to populate cache");
    }

    Ok(value)
}

/// Treat an empty collection as absent
pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
