//! Optimistic upload execution.
//!
//! Each mutation is its own small state machine over one cache key:
//! `Pending(snapshot) -> Committed | RolledBack`. Within one mutation the
//! optimistic insert strictly precedes dispatch and reconciliation strictly
//! follows the response. Across concurrent mutations on the same key there
//! is no ordering guarantee: each carries only its own snapshot, so a
//! rollback landing after another upload's invalidation can resurrect a
//! placeholder (last write wins). Accepted limitation, not a guarantee.

use chrono::Utc;
use tracing::{info, warn};

use crate::api::MemoriaApi;
use crate::cache::{MemoryCache, Snapshot};
use crate::errors::ApiError;
use crate::memories::upload::ValidatedUpload;
use crate::models::memory::{Memory, MemoryKey};
use crate::models::user::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

/// One in-flight optimistic mutation. `begin` snapshots the key and
/// inserts the placeholder; exactly one of `commit` / `roll_back` ends it.
///
/// There is deliberately no Drop handling: if the future driving the
/// mutation is dropped mid-request the placeholder stays behind, matching
/// the navigate-away behavior of the UI this layer serves.
pub struct OptimisticMutation<'a> {
    cache: &'a MemoryCache,
    key: MemoryKey,
    snapshot: Snapshot<MemoryKey, Vec<Memory>>,
}

impl<'a> OptimisticMutation<'a> {
    /// Captures the pre-mutation state, then makes the placeholder visible
    /// at the head of the list.
    pub fn begin(cache: &'a MemoryCache, key: MemoryKey, placeholder: Memory) -> Self {
        let snapshot = cache.snapshot(&key);
        cache.insert_head(key, placeholder);
        OptimisticMutation {
            cache,
            key,
            snapshot,
        }
    }

    /// Success: the optimistic entry is discarded wholesale by invalidating
    /// the key; the next read refetches authoritative data.
    pub fn commit(self) -> MutationState {
        self.cache.invalidate(&self.key);
        MutationState::Committed
    }

    /// Failure: the key is restored to exactly the captured snapshot. No
    /// partial merge.
    pub fn roll_back(self) -> MutationState {
        self.cache.restore(self.snapshot);
        MutationState::RolledBack
    }
}

/// Uploads a single validated memory with optimistic cache projection.
///
/// The server's error message is propagated verbatim for display; callers
/// fall back to the generic message via `ApiError::user_message`.
pub async fn upload_memory(
    api: &dyn MemoriaApi,
    cache: &MemoryCache,
    session: &Session,
    upload: ValidatedUpload,
) -> Result<Memory, ApiError> {
    let key = upload.key();
    let placeholder = upload.placeholder(Utc::now(), &session.display_name);
    let mutation = OptimisticMutation::begin(cache, key, placeholder);

    match api.create_memory(&session.token, upload.new_memory()).await {
        Ok(created) => {
            mutation.commit();
            info!(memory_id = %created.id, year = key.year, "Memory uploaded");
            Ok(created)
        }
        Err(err) => {
            mutation.roll_back();
            warn!(error = %err, year = key.year, "Memory upload failed, cache rolled back");
            Err(err)
        }
    }
}

#[derive(Debug)]
pub struct BatchFailure {
    pub filename: String,
    pub error: ApiError,
}

/// Outcome of a batch upload: which files landed and which rolled back.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<Memory>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Uploads a validated batch. Files are dispatched one at a time, each as
/// an independent mutation with its own snapshot and rollback; one failure
/// does not stop the rest of the batch.
pub async fn upload_batch(
    api: &dyn MemoriaApi,
    cache: &MemoryCache,
    session: &Session,
    uploads: Vec<ValidatedUpload>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for upload in uploads {
        let filename = upload.new_memory().file.filename.clone();
        match upload_memory(api, cache, session, upload).await {
            Ok(memory) => report.succeeded.push(memory),
            Err(error) => report.failed.push(BatchFailure { filename, error }),
        }
    }
    report
}
