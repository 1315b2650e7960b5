use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::memory::MemoryCategory;

/// A time-limited 16-character credential allowing external contributors
/// to upload without an account. Server-owned; the client only observes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLinkCode {
    pub id: String,
    #[serde(rename = "linkCode")]
    pub code: String,
    pub school_id: Uuid,
    pub category: MemoryCategory,
    pub year: i32,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub current_uploads: u32,
}

/// Request body for link generation. `valid_for_hours` goes over the wire
/// as a string because that is what the backend's select-driven endpoint
/// expects ("24", not 24).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUploadLink {
    pub school_id: Uuid,
    pub category: MemoryCategory,
    pub year: i32,
    pub valid_for_hours: String,
}

impl NewUploadLink {
    pub fn new(school_id: Uuid, year: i32, category: MemoryCategory, validity: LinkValidity) -> Self {
        NewUploadLink {
            school_id,
            category,
            year,
            valid_for_hours: validity.hours().to_string(),
        }
    }
}

/// Validity window selectable when generating a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkValidity {
    OneHour,
    SixHours,
    TwelveHours,
    OneDay,
    TwoDays,
}

impl LinkValidity {
    pub const ALL: [LinkValidity; 5] = [
        LinkValidity::OneHour,
        LinkValidity::SixHours,
        LinkValidity::TwelveHours,
        LinkValidity::OneDay,
        LinkValidity::TwoDays,
    ];

    pub fn hours(&self) -> i64 {
        match self {
            LinkValidity::OneHour => 1,
            LinkValidity::SixHours => 6,
            LinkValidity::TwelveHours => 12,
            LinkValidity::OneDay => 24,
            LinkValidity::TwoDays => 48,
        }
    }

    /// Parses the hour values the selector offers. Anything else is not a
    /// valid window.
    pub fn from_hours(hours: i64) -> Option<Self> {
        match hours {
            1 => Some(LinkValidity::OneHour),
            6 => Some(LinkValidity::SixHours),
            12 => Some(LinkValidity::TwelveHours),
            24 => Some(LinkValidity::OneDay),
            48 => Some(LinkValidity::TwoDays),
            _ => None,
        }
    }
}

/// Link state as observed by the client. `Expired` is a display label
/// computed from the clock; it does not deactivate the code. Only a server
/// response is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Active,
    Expired,
    Inactive,
}

impl UploadLinkCode {
    pub fn observed_state(&self, now: DateTime<Utc>) -> LinkState {
        if !self.is_active {
            LinkState::Inactive
        } else if now >= self.expires_at {
            LinkState::Expired
        } else {
            LinkState::Active
        }
    }

    /// Time left on the countdown, `None` once expired or deactivated.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.observed_state(now) {
            LinkState::Active => Some(self.expires_at - now),
            LinkState::Expired | LinkState::Inactive => None,
        }
    }
}
