use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Viewer,
}

/// A signed-in session. `token` is an opaque signed credential issued by
/// the server at 2FA verification; it is the only thing sent in the
/// `Authorization` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub school_id: Uuid,
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
pub fn test_session() -> Session {
    Session {
        token: "tok-test".to_string(),
        user_id: Uuid::new_v4(),
        school_id: Uuid::new_v4(),
        display_name: "A. Admin".to_string(),
        role: UserRole::Admin,
    }
}

/// Issued by a successful password check; the session only exists after
/// the challenge is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorChallenge {
    pub challenge_id: String,
    /// Masked delivery target, e.g. `a***@school.edu`. Display only.
    pub sent_to: String,
}
