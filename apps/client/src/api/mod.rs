//! Platform API boundary.
//!
//! `MemoriaApi` is the only seam through which the client talks to the
//! backend; no service module may issue a request directly. Carried as
//! `Arc<dyn MemoriaApi>` so tests can swap in a scripted double.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::link::{NewUploadLink, UploadLinkCode};
use crate::models::memory::{Memory, MemoryEdit, MemoryKey, NewMemory};
use crate::models::user::{Credentials, Session, TwoFactorChallenge};
use crate::payments::{BankAccount, PaymentSettings, PaymentSettingsUpdate, ResolvedAccount};

pub mod http;

pub use http::HttpApi;

#[async_trait]
pub trait MemoriaApi: Send + Sync {
    // Auth
    async fn login(&self, credentials: &Credentials) -> Result<TwoFactorChallenge, ApiError>;
    async fn resend_code(&self, challenge_id: &str) -> Result<(), ApiError>;
    async fn verify_code(&self, challenge_id: &str, code: &str) -> Result<Session, ApiError>;

    // Memories
    async fn list_memories(&self, token: &str, key: MemoryKey) -> Result<Vec<Memory>, ApiError>;
    async fn create_memory(&self, token: &str, memory: &NewMemory) -> Result<Memory, ApiError>;
    async fn update_memory(
        &self,
        token: &str,
        id: &str,
        edit: &MemoryEdit,
    ) -> Result<Memory, ApiError>;
    async fn approve_memory(&self, token: &str, id: &str) -> Result<Memory, ApiError>;
    async fn delete_memory(&self, token: &str, id: &str) -> Result<(), ApiError>;

    // Upload links
    async fn create_upload_link(
        &self,
        token: &str,
        link: &NewUploadLink,
    ) -> Result<UploadLinkCode, ApiError>;
    async fn get_upload_link(&self, code: &str) -> Result<UploadLinkCode, ApiError>;
    async fn delete_upload_link(&self, token: &str, id: &str) -> Result<(), ApiError>;
    async fn public_upload(&self, code: &str, memory: &NewMemory) -> Result<Memory, ApiError>;

    // Payments
    async fn payment_settings(
        &self,
        token: &str,
        school_id: Uuid,
    ) -> Result<PaymentSettings, ApiError>;
    async fn resolve_account(
        &self,
        token: &str,
        school_id: Uuid,
        account: &BankAccount,
    ) -> Result<ResolvedAccount, ApiError>;
    async fn update_payment_settings(
        &self,
        token: &str,
        school_id: Uuid,
        update: &PaymentSettingsUpdate,
    ) -> Result<PaymentSettings, ApiError>;
}
