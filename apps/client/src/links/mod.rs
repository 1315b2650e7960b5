//! Upload link codes: generation, validation and the contributor flow.
//!
//! The server owns the code lifecycle. The client's countdown is a display
//! label computed from the clock; it never deactivates a code. Only the
//! next server call is authoritative on expiry.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::api::MemoriaApi;
use crate::errors::ApiError;
use crate::memories::upload::UploadForm;
use crate::models::link::{LinkValidity, NewUploadLink, UploadLinkCode};
use crate::models::memory::{Memory, MemoryCategory};
use crate::models::user::Session;

/// Length of a code once formatting is stripped.
pub const CODE_LENGTH: usize = 16;

/// Strips formatting dashes and whitespace and uppercases the rest. A
/// result that is not exactly 16 alphanumerics is rejected here, before
/// any request is made.
pub fn normalize_code(input: &str) -> Result<String, ApiError> {
    let stripped: String = input
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if stripped.len() != CODE_LENGTH || !stripped.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::Validation(
            "Upload codes are 16 letters and digits".to_string(),
        ));
    }
    Ok(stripped)
}

/// Generates a time-limited upload link for the signed-in school's year.
/// The server enforces one active link per school/year; that conflict
/// comes back as `ApiError::Conflict` and the UI presents it distinctly
/// (`ApiError::is_duplicate_link`).
pub async fn generate(
    api: &dyn MemoriaApi,
    session: &Session,
    year: i32,
    category: MemoryCategory,
    validity: LinkValidity,
) -> Result<UploadLinkCode, ApiError> {
    let request = NewUploadLink::new(session.school_id, year, category, validity);
    match api.create_upload_link(&session.token, &request).await {
        Ok(link) => {
            info!(year, hours = validity.hours(), "Upload link generated");
            Ok(link)
        }
        Err(err) => {
            if err.is_duplicate_link() {
                warn!(year, "Upload link refused: an active link already exists");
            }
            Err(err)
        }
    }
}

/// Validates a contributor-entered code. Local normalization gates the
/// request; the server stays authoritative on expiry and activity.
pub async fn validate(api: &dyn MemoriaApi, input: &str) -> Result<UploadLinkCode, ApiError> {
    let code = normalize_code(input)?;
    api.get_upload_link(&code).await
}

/// Explicitly deactivates a link ahead of its expiry.
pub async fn deactivate(
    api: &dyn MemoriaApi,
    session: &Session,
    link_id: &str,
) -> Result<(), ApiError> {
    api.delete_upload_link(&session.token, link_id).await?;
    info!(%link_id, "Upload link deactivated");
    Ok(())
}

/// Contributor upload against a code: same form validation as the admin
/// path, no optimistic projection (contributors have no admin list to
/// project into).
pub async fn contributor_upload(
    api: &dyn MemoriaApi,
    code_input: &str,
    form: UploadForm,
) -> Result<Memory, ApiError> {
    let code = normalize_code(code_input)?;
    let upload = form.validate()?;
    let created = api.public_upload(&code, upload.new_memory()).await?;
    info!(memory_id = %created.id, "Contributor upload accepted");
    Ok(created)
}

/// Fixed display format for a server expiry timestamp.
pub fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at.format("%Y-%m-%d %H:%M UTC").to_string()
}
