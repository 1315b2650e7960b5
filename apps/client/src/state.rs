use std::sync::Arc;

use crate::api::{HttpApi, MemoriaApi};
use crate::auth::session::SessionStore;
use crate::cache::{MemoryCache, PaymentsCache};
use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::memories::moderation::ModerationQueue;
use crate::models::user::Session;

/// Everything a page-level flow needs, owned in one place and passed by
/// reference. Nothing here is global: embedding two `ClientState`s in one
/// process gives two fully independent caches.
pub struct ClientState {
    pub api: Arc<dyn MemoriaApi>,
    pub memories: MemoryCache,
    pub payments: PaymentsCache,
    pub moderation: ModerationQueue,
    pub sessions: SessionStore,
    pub config: ClientConfig,
}

impl ClientState {
    pub fn new(config: ClientConfig) -> Self {
        let api = Arc::new(HttpApi::new(&config));
        ClientState::with_api(api, config)
    }

    /// Seam for tests and embedders that bring their own transport.
    pub fn with_api(api: Arc<dyn MemoriaApi>, config: ClientConfig) -> Self {
        ClientState {
            api,
            memories: MemoryCache::new(),
            payments: PaymentsCache::new(),
            moderation: ModerationQueue::new(),
            sessions: SessionStore::new(config.session_file.clone()),
            config,
        }
    }

    /// The signed-in session, or `NotSignedIn` for flows that require one.
    pub fn session(&self) -> Result<Session, ApiError> {
        self.sessions.load()?.ok_or(ApiError::NotSignedIn)
    }
}
