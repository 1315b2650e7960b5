use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classifies a MIME type string. Anything outside `image/*` and
    /// `video/*` is not uploadable.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        if essence.starts_with("image/") {
            Some(MediaType::Image)
        } else if essence.starts_with("video/") {
            Some(MediaType::Video)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Graduation,
    Sports,
    Arts,
    FieldTrips,
    Academic,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 5] = [
        MemoryCategory::Graduation,
        MemoryCategory::Sports,
        MemoryCategory::Arts,
        MemoryCategory::FieldTrips,
        MemoryCategory::Academic,
    ];

    /// Wire name, as sent in multipart form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Graduation => "graduation",
            MemoryCategory::Sports => "sports",
            MemoryCategory::Arts => "arts",
            MemoryCategory::FieldTrips => "field_trips",
            MemoryCategory::Academic => "academic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    Pending,
    Approved,
}

/// Cache key for everything scoped to a school's academic year: the memory
/// list, the link list, the moderation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryKey {
    pub school_id: Uuid,
    pub year: i32,
}

/// A single photo/video record attached to a school and academic year.
///
/// `id` is a server-assigned opaque string. Optimistic placeholders use
/// `temp-<unix millis>` ids and exist only in the local cache; they are
/// replaced wholesale by a refetch, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub school_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub media_type: MediaType,
    pub url: String,
    pub category: MemoryCategory,
    pub year: i32,
    pub status: MemoryStatus,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    /// Client-only marker for an in-flight optimistic placeholder.
    /// Never serialized; the server knows nothing about it.
    #[serde(skip)]
    pub uploading: bool,
}

impl Memory {
    pub fn is_optimistic(&self) -> bool {
        self.id.starts_with("temp-")
    }
}

/// The file part of an upload: raw bytes plus what the picker knew about it.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    /// Content type reported by the picker, if any. When absent the type
    /// is inferred from the filename.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A validated memory creation request, ready for dispatch.
/// Only `memories::upload` can construct one (via form validation).
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub school_id: Uuid,
    pub year: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: MemoryCategory,
    pub event_date: Option<NaiveDate>,
    pub media_type: MediaType,
    pub file: UploadFile,
}

/// Admin metadata edit. Absent fields are left unchanged server-side.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MemoryCategory>,
}

#[cfg(test)]
pub(crate) fn sample_memory() -> Memory {
    Memory {
        id: "mem-1".to_string(),
        school_id: Uuid::new_v4(),
        title: "Prom night".to_string(),
        description: None,
        media_type: MediaType::Image,
        url: "https://cdn.example/m/mem-1.jpg".to_string(),
        category: MemoryCategory::Graduation,
        year: 2024,
        status: MemoryStatus::Pending,
        uploaded_by: "A. Admin".to_string(),
        created_at: "2024-06-01T12:00:00Z".parse().expect("valid timestamp"),
        uploading: false,
    }
}
