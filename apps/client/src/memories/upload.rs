//! Upload form validation. Purely local: a form that fails here never
//! reaches the network.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::memory::{
    MediaType, Memory, MemoryCategory, MemoryKey, MemoryStatus, NewMemory, UploadFile,
};

/// Single-file ceiling.
pub const MAX_FILE_BYTES: usize = 20 * 1024 * 1024;
/// Aggregate ceiling for a batch.
pub const MAX_BATCH_BYTES: usize = 50 * 1024 * 1024;

/// What the upload dialog collects before submission.
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub school_id: Uuid,
    pub year: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: MemoryCategory,
    pub event_date: Option<NaiveDate>,
    pub file: UploadFile,
}

/// Proof of validation: the only way to construct one is
/// [`UploadForm::validate`], so dispatch paths cannot accept an unchecked
/// form by construction.
#[derive(Debug, Clone)]
pub struct ValidatedUpload(NewMemory);

impl ValidatedUpload {
    pub fn new_memory(&self) -> &NewMemory {
        &self.0
    }

    pub fn key(&self) -> MemoryKey {
        MemoryKey {
            school_id: self.0.school_id,
            year: self.0.year,
        }
    }

    /// The transient cache entry shown while the request is in flight.
    /// Carries a `temp-<unix millis>` id and the `uploading` marker; it is
    /// discarded wholesale on reconciliation, never patched.
    pub fn placeholder(&self, now: DateTime<Utc>, uploaded_by: &str) -> Memory {
        Memory {
            id: format!("temp-{}", now.timestamp_millis()),
            school_id: self.0.school_id,
            title: self.0.title.clone(),
            description: self.0.description.clone(),
            media_type: self.0.media_type,
            url: String::new(),
            category: self.0.category,
            year: self.0.year,
            status: MemoryStatus::Pending,
            uploaded_by: uploaded_by.to_string(),
            created_at: now,
            uploading: true,
        }
    }
}

impl UploadForm {
    pub fn validate(self) -> Result<ValidatedUpload, ApiError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::Validation("Title is required".to_string()));
        }

        if self.file.bytes.is_empty() {
            return Err(ApiError::Validation(
                "Select a photo or video to upload".to_string(),
            ));
        }
        if self.file.bytes.len() > MAX_FILE_BYTES {
            return Err(ApiError::Validation(format!(
                "{} exceeds the 20MB upload limit",
                self.file.filename
            )));
        }

        let mime = resolve_mime(&self.file);
        let media_type = mime
            .as_deref()
            .and_then(MediaType::from_mime)
            .ok_or_else(|| {
                ApiError::Validation("Only image and video files can be uploaded".to_string())
            })?;

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(ValidatedUpload(NewMemory {
            school_id: self.school_id,
            year: self.year,
            title,
            description,
            category: self.category,
            event_date: self.event_date,
            media_type,
            file: UploadFile {
                content_type: mime,
                ..self.file
            },
        }))
    }
}

/// Validates a batch: the aggregate ceiling first, then each file on its
/// own. One bad file rejects the whole batch before anything is sent.
pub fn validate_batch(forms: Vec<UploadForm>) -> Result<Vec<ValidatedUpload>, ApiError> {
    let total: usize = forms.iter().map(|f| f.file.bytes.len()).sum();
    if total > MAX_BATCH_BYTES {
        return Err(ApiError::Validation(
            "Selected files exceed the 50MB batch limit".to_string(),
        ));
    }
    forms.into_iter().map(UploadForm::validate).collect()
}

/// Picker-reported content type when present, otherwise inferred from the
/// filename.
fn resolve_mime(file: &UploadFile) -> Option<String> {
    file.content_type.clone().or_else(|| {
        mime_guess::from_path(&file.filename)
            .first_raw()
            .map(|m| m.to_string())
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn form_with_file(filename: &str, content_type: Option<&str>, size: usize) -> UploadForm {
        UploadForm {
            school_id: Uuid::new_v4(),
            year: 2024,
            title: "Sports day".to_string(),
            description: Some("Track finals".to_string()),
            category: MemoryCategory::Sports,
            event_date: None,
            file: UploadFile {
                filename: filename.to_string(),
                content_type: content_type.map(|s| s.to_string()),
                bytes: Bytes::from(vec![0u8; size]),
            },
        }
    }

    #[test]
    fn test_valid_image_upload_passes() {
        let validated = form_with_file("finals.jpg", Some("image/jpeg"), 1024)
            .validate()
            .unwrap();
        assert_eq!(validated.new_memory().media_type, MediaType::Image);
        assert_eq!(
            validated.new_memory().file.content_type.as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn test_oversized_file_rejected_with_limit_in_message() {
        let err = form_with_file("finals.jpg", Some("image/jpeg"), 25 * 1024 * 1024)
            .validate()
            .unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("20MB"), "message was: {msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut form = form_with_file("finals.jpg", Some("image/jpeg"), 1024);
        form.title = "   ".to_string();
        let err = form.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = form_with_file("finals.jpg", Some("image/jpeg"), 0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_non_media_file_rejected() {
        let err = form_with_file("notes.pdf", Some("application/pdf"), 1024)
            .validate()
            .unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("image and video")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_media_type_inferred_from_filename_when_picker_silent() {
        let validated = form_with_file("clip.mp4", None, 1024).validate().unwrap();
        assert_eq!(validated.new_memory().media_type, MediaType::Video);
        assert_eq!(
            validated.new_memory().file.content_type.as_deref(),
            Some("video/mp4")
        );
    }

    #[test]
    fn test_batch_aggregate_over_50mb_rejected() {
        let forms = vec![
            form_with_file("a.jpg", Some("image/jpeg"), 18 * 1024 * 1024),
            form_with_file("b.jpg", Some("image/jpeg"), 18 * 1024 * 1024),
            form_with_file("c.jpg", Some("image/jpeg"), 18 * 1024 * 1024),
        ];
        let err = validate_batch(forms).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("50MB"), "message was: {msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_within_limits_validates_every_file() {
        let forms = vec![
            form_with_file("a.jpg", Some("image/jpeg"), 1024),
            form_with_file("b.mp4", Some("video/mp4"), 2048),
        ];
        let validated = validate_batch(forms).unwrap();
        assert_eq!(validated.len(), 2);
    }

    #[test]
    fn test_placeholder_is_marked_optimistic() {
        let validated = form_with_file("finals.jpg", Some("image/jpeg"), 1024)
            .validate()
            .unwrap();
        let now = "2024-06-01T12:00:00Z".parse().unwrap();
        let placeholder = validated.placeholder(now, "A. Admin");
        assert!(placeholder.uploading);
        assert!(placeholder.is_optimistic());
        assert_eq!(placeholder.id, format!("temp-{}", now.timestamp_millis()));
        assert_eq!(placeholder.status, MemoryStatus::Pending);
    }
}
