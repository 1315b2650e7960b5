//! Approve/deny workflow gating visibility of contributor submissions.
//!
//! Denial is deletion: the backend removes the record outright rather than
//! keeping a third status. Neither action is retried automatically; a
//! failure leaves the item in the pending list and the error is handed
//! back for a toast.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::api::MemoriaApi;
use crate::cache::MemoryCache;
use crate::errors::ApiError;
use crate::models::memory::{Memory, MemoryKey, MemoryStatus};
use crate::models::user::Session;

/// Splits a cached list into what the moderation view renders: pending
/// submissions first, then the approved gallery.
pub fn split_by_status(memories: &[Memory]) -> (Vec<Memory>, Vec<Memory>) {
    memories
        .iter()
        .cloned()
        .partition(|m| m.status == MemoryStatus::Pending)
}

/// Serializes moderation actions per item. While a mutation for an id is
/// in flight, further actions on that id are refused, which is what keeps
/// the approve/deny buttons disabled in the UI.
#[derive(Debug, Default)]
pub struct ModerationQueue {
    in_flight: Mutex<HashSet<String>>,
}

/// Releases the id when the mutation resolves, whatever the outcome.
#[derive(Debug)]
struct InFlightGuard<'a> {
    queue: &'a ModerationQueue,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.queue
            .in_flight
            .lock()
            .expect("moderation lock poisoned")
            .remove(&self.id);
    }
}

impl ModerationQueue {
    pub fn new() -> Self {
        ModerationQueue::default()
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .expect("moderation lock poisoned")
            .contains(id)
    }

    fn begin(&self, id: &str) -> Result<InFlightGuard<'_>, ApiError> {
        let mut in_flight = self.in_flight.lock().expect("moderation lock poisoned");
        if !in_flight.insert(id.to_string()) {
            return Err(ApiError::Conflict(
                "A moderation action for this item is already in progress".to_string(),
            ));
        }
        Ok(InFlightGuard {
            queue: self,
            id: id.to_string(),
        })
    }

    /// Transitions a submission pending -> approved. On success the key is
    /// invalidated so the item shows up in the approved list on refetch.
    pub async fn approve(
        &self,
        api: &dyn MemoriaApi,
        cache: &MemoryCache,
        session: &Session,
        key: MemoryKey,
        id: &str,
    ) -> Result<Memory, ApiError> {
        let _guard = self.begin(id)?;
        match api.approve_memory(&session.token, id).await {
            Ok(approved) => {
                cache.invalidate(&key);
                info!(memory_id = %id, "Memory approved");
                Ok(approved)
            }
            Err(err) => {
                warn!(memory_id = %id, error = %err, "Approve failed, item stays pending");
                Err(err)
            }
        }
    }

    /// Denies a submission by deleting it outright.
    pub async fn deny(
        &self,
        api: &dyn MemoriaApi,
        cache: &MemoryCache,
        session: &Session,
        key: MemoryKey,
        id: &str,
    ) -> Result<(), ApiError> {
        let _guard = self.begin(id)?;
        match api.delete_memory(&session.token, id).await {
            Ok(()) => {
                cache.invalidate(&key);
                info!(memory_id = %id, "Memory denied and deleted");
                Ok(())
            }
            Err(err) => {
                warn!(memory_id = %id, error = %err, "Deny failed, item stays pending");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedApi;
    use crate::models::memory::sample_memory;
    use crate::models::user::test_session;

    fn key_for(session: &crate::models::user::Session) -> MemoryKey {
        MemoryKey {
            school_id: session.school_id,
            year: 2024,
        }
    }

    #[test]
    fn test_split_by_status_partitions_pending_first() {
        let mut approved = sample_memory();
        approved.id = "mem-2".to_string();
        approved.status = MemoryStatus::Approved;
        let pendings = sample_memory();

        let (pending, done) = split_by_status(&[approved.clone(), pendings.clone()]);
        assert_eq!(pending, vec![pendings]);
        assert_eq!(done, vec![approved]);
    }

    #[tokio::test]
    async fn test_approve_invalidates_key_on_success() {
        let session = test_session();
        let key = key_for(&session);
        let api = ScriptedApi::new();
        let mut approved = sample_memory();
        approved.status = MemoryStatus::Approved;
        api.script_approve_memory(Ok(approved));

        let cache = MemoryCache::new();
        cache.put(key, vec![sample_memory()]);

        let queue = ModerationQueue::new();
        let result = queue
            .approve(&api, &cache, &session, key, "mem-1")
            .await
            .unwrap();
        assert_eq!(result.status, MemoryStatus::Approved);
        assert!(!cache.is_fresh(&key), "key invalidated for refetch");
        assert!(!queue.is_in_flight("mem-1"), "id released after resolution");
    }

    #[tokio::test]
    async fn test_failed_approve_leaves_cache_untouched() {
        let session = test_session();
        let key = key_for(&session);
        let api = ScriptedApi::new();
        api.script_approve_memory(Err(ApiError::Api {
            status: 500,
            message: "Moderation service down".to_string(),
        }));

        let cache = MemoryCache::new();
        let pending_list = vec![sample_memory()];
        cache.put(key, pending_list.clone());

        let queue = ModerationQueue::new();
        let err = queue
            .approve(&api, &cache, &session, key, "mem-1")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Moderation service down");
        assert_eq!(cache.get(&key), Some(pending_list));
        assert!(!queue.is_in_flight("mem-1"));
    }

    #[tokio::test]
    async fn test_reentry_refused_while_in_flight() {
        let queue = ModerationQueue::new();
        let guard = queue.begin("mem-1").unwrap();
        assert!(queue.is_in_flight("mem-1"));

        let err = queue.begin("mem-1").unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        // A different item is unaffected.
        assert!(queue.begin("mem-2").is_ok());

        drop(guard);
        assert!(queue.begin("mem-1").is_ok());
    }

    #[tokio::test]
    async fn test_deny_deletes_and_invalidates() {
        let session = test_session();
        let key = key_for(&session);
        let api = ScriptedApi::new();
        api.script_delete_memory(Ok(()));

        let cache = MemoryCache::new();
        cache.put(key, vec![sample_memory()]);

        let queue = ModerationQueue::new();
        queue
            .deny(&api, &cache, &session, key, "mem-1")
            .await
            .unwrap();
        assert!(!cache.is_fresh(&key));
        assert_eq!(api.calls(), vec!["delete_memory".to_string()]);
    }
}
