//! `reqwest`-backed implementation of [`MemoriaApi`].
//!
//! Mutations are never retried: every failure is terminal for the action
//! that triggered it and is reported back to the caller for display.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::api::MemoriaApi;
use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::models::link::{NewUploadLink, UploadLinkCode};
use crate::models::memory::{Memory, MemoryEdit, MemoryKey, NewMemory};
use crate::models::user::{Credentials, Session, TwoFactorChallenge};
use crate::payments::{BankAccount, PaymentSettings, PaymentSettingsUpdate, ResolvedAccount};

/// Error body convention of the backend: `{"error": {"code", "message"}}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    #[allow(dead_code)]
    code: Option<String>,
    message: String,
}

pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Self {
        HttpApi {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Parses a success body, or maps the failure to the client taxonomy.
    async fn read_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like `read_json` but for endpoints that answer 204 No Content.
    async fn read_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        // Prefer the structured message; fall back to the raw body.
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(Self::map_error(status, message))
    }

    fn map_error(status: StatusCode, message: String) -> ApiError {
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized
        } else if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(message)
        } else if status == StatusCode::CONFLICT
            // Older backend builds report the single-active-link rule as a
            // plain 400; the message substring is the only signal.
            || message.contains("active upload link")
        {
            ApiError::Conflict(message)
        } else {
            ApiError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Multipart body for memory creation, both the admin and the
    /// contributor endpoint. Field names are the backend's.
    fn multipart_form(memory: &NewMemory) -> Result<Form, ApiError> {
        let mime = memory
            .file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let file_part = Part::bytes(memory.file.bytes.to_vec())
            .file_name(memory.file.filename.clone())
            .mime_str(mime)?;

        let mut form = Form::new()
            .part("memoryFile", file_part)
            .text("title", memory.title.clone())
            .text("year", memory.year.to_string())
            .text("category", memory.category.as_str())
            .text("schoolId", memory.school_id.to_string());
        if let Some(description) = &memory.description {
            form = form.text("description", description.clone());
        }
        if let Some(event_date) = memory.event_date {
            form = form.text("eventDate", event_date.format("%Y-%m-%d").to_string());
        }
        Ok(form)
    }
}

#[async_trait]
impl MemoriaApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<TwoFactorChallenge, ApiError> {
        debug!("POST /api/auth/login");
        self.read_json(self.http.post(self.url("/api/auth/login")).json(credentials))
            .await
    }

    async fn resend_code(&self, challenge_id: &str) -> Result<(), ApiError> {
        debug!("POST /api/auth/2fa/resend");
        self.read_empty(
            self.http
                .post(self.url("/api/auth/2fa/resend"))
                .json(&serde_json::json!({ "challengeId": challenge_id })),
        )
        .await
    }

    async fn verify_code(&self, challenge_id: &str, code: &str) -> Result<Session, ApiError> {
        debug!("POST /api/auth/2fa/verify");
        self.read_json(
            self.http
                .post(self.url("/api/auth/2fa/verify"))
                .json(&serde_json::json!({ "challengeId": challenge_id, "code": code })),
        )
        .await
    }

    async fn list_memories(&self, token: &str, key: MemoryKey) -> Result<Vec<Memory>, ApiError> {
        debug!(school_id = %key.school_id, year = key.year, "GET /api/memories");
        self.read_json(
            self.http
                .get(self.url("/api/memories"))
                .bearer_auth(token)
                .query(&[
                    ("schoolId", key.school_id.to_string()),
                    ("year", key.year.to_string()),
                ]),
        )
        .await
    }

    async fn create_memory(&self, token: &str, memory: &NewMemory) -> Result<Memory, ApiError> {
        debug!(title = %memory.title, "POST /api/memories");
        let form = Self::multipart_form(memory)?;
        self.read_json(
            self.http
                .post(self.url("/api/memories"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }

    async fn update_memory(
        &self,
        token: &str,
        id: &str,
        edit: &MemoryEdit,
    ) -> Result<Memory, ApiError> {
        debug!(memory_id = %id, "PATCH /api/memories/:id");
        self.read_json(
            self.http
                .patch(self.url(&format!("/api/memories/{id}")))
                .bearer_auth(token)
                .json(edit),
        )
        .await
    }

    async fn approve_memory(&self, token: &str, id: &str) -> Result<Memory, ApiError> {
        debug!(memory_id = %id, "PATCH /api/memories/:id/approve");
        self.read_json(
            self.http
                .patch(self.url(&format!("/api/memories/{id}/approve")))
                .bearer_auth(token),
        )
        .await
    }

    async fn delete_memory(&self, token: &str, id: &str) -> Result<(), ApiError> {
        debug!(memory_id = %id, "DELETE /api/memories/:id");
        self.read_empty(
            self.http
                .delete(self.url(&format!("/api/memories/{id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn create_upload_link(
        &self,
        token: &str,
        link: &NewUploadLink,
    ) -> Result<UploadLinkCode, ApiError> {
        debug!("POST /api/public-upload-links");
        self.read_json(
            self.http
                .post(self.url("/api/public-upload-links"))
                .bearer_auth(token)
                .json(link),
        )
        .await
    }

    async fn get_upload_link(&self, code: &str) -> Result<UploadLinkCode, ApiError> {
        debug!("GET /api/public-upload-links/:code");
        self.read_json(
            self.http
                .get(self.url(&format!("/api/public-upload-links/{code}"))),
        )
        .await
    }

    async fn delete_upload_link(&self, token: &str, id: &str) -> Result<(), ApiError> {
        debug!(link_id = %id, "DELETE /api/public-upload-links/:id");
        self.read_empty(
            self.http
                .delete(self.url(&format!("/api/public-upload-links/{id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn public_upload(&self, code: &str, memory: &NewMemory) -> Result<Memory, ApiError> {
        debug!("POST /api/public-uploads/:code");
        let form = Self::multipart_form(memory)?;
        self.read_json(
            self.http
                .post(self.url(&format!("/api/public-uploads/{code}")))
                .multipart(form),
        )
        .await
    }

    async fn payment_settings(
        &self,
        token: &str,
        school_id: Uuid,
    ) -> Result<PaymentSettings, ApiError> {
        debug!(%school_id, "GET /api/schools/:id/payment-settings");
        self.read_json(
            self.http
                .get(self.url(&format!("/api/schools/{school_id}/payment-settings")))
                .bearer_auth(token),
        )
        .await
    }

    async fn resolve_account(
        &self,
        token: &str,
        school_id: Uuid,
        account: &BankAccount,
    ) -> Result<ResolvedAccount, ApiError> {
        debug!(%school_id, "POST /api/schools/:id/payment-settings/resolve");
        self.read_json(
            self.http
                .post(self.url(&format!(
                    "/api/schools/{school_id}/payment-settings/resolve"
                )))
                .bearer_auth(token)
                .json(account),
        )
        .await
    }

    async fn update_payment_settings(
        &self,
        token: &str,
        school_id: Uuid,
        update: &PaymentSettingsUpdate,
    ) -> Result<PaymentSettings, ApiError> {
        debug!(%school_id, "PUT /api/schools/:id/payment-settings");
        self.read_json(
            self.http
                .put(self.url(&format!("/api/schools/{school_id}/payment-settings")))
                .bearer_auth(token)
                .json(update),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error_distinguishes_conflict_by_status() {
        let err = HttpApi::map_error(
            StatusCode::CONFLICT,
            "An active upload link already exists for this year".to_string(),
        );
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_map_error_falls_back_to_message_substring() {
        let err = HttpApi::map_error(
            StatusCode::BAD_REQUEST,
            "An active upload link already exists for this year".to_string(),
        );
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_map_error_plain_failure_keeps_status_and_message() {
        let err = HttpApi::map_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_maps_to_dedicated_variant() {
        let err = HttpApi::map_error(StatusCode::UNAUTHORIZED, "nope".to_string());
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
