//! Memory browsing and admin mutations over the shared cache.

pub mod moderation;
pub mod mutation;
pub mod upload;

use tracing::debug;

use crate::api::MemoriaApi;
use crate::cache::MemoryCache;
use crate::errors::ApiError;
use crate::models::memory::{Memory, MemoryEdit, MemoryKey};
use crate::models::user::Session;

/// Read-through fetch of a school/year's memories. A fresh cache entry is
/// served as-is; a miss or invalidated entry refetches and repopulates.
pub async fn list_memories(
    api: &dyn MemoriaApi,
    cache: &MemoryCache,
    session: &Session,
    key: MemoryKey,
) -> Result<Vec<Memory>, ApiError> {
    if let Some(cached) = cache.get(&key) {
        debug!(year = key.year, "Memory list served from cache");
        return Ok(cached);
    }
    let fetched = api.list_memories(&session.token, key).await?;
    cache.put(key, fetched.clone());
    Ok(fetched)
}

/// Admin metadata edit. The edited record comes back from the server; the
/// cached list is invalidated rather than patched.
pub async fn edit_memory(
    api: &dyn MemoriaApi,
    cache: &MemoryCache,
    session: &Session,
    key: MemoryKey,
    id: &str,
    edit: MemoryEdit,
) -> Result<Memory, ApiError> {
    let updated = api.update_memory(&session.token, id, &edit).await?;
    cache.invalidate(&key);
    Ok(updated)
}

/// Explicit admin delete (distinct from moderation denial, which happens
/// to hit the same endpoint).
pub async fn delete_memory(
    api: &dyn MemoriaApi,
    cache: &MemoryCache,
    session: &Session,
    key: MemoryKey,
    id: &str,
) -> Result<(), ApiError> {
    api.delete_memory(&session.token, id).await?;
    cache.invalidate(&key);
    Ok(())
}
