use thiserror::Error;

/// Client-level error type shared by every service module.
///
/// Server-reported messages are carried verbatim so the UI layer can show
/// them unchanged; `user_message` supplies the generic fallback when no
/// message is available.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Session store error: {0}")]
    SessionStore(#[from] std::io::Error),
}

/// Fallback shown when the server sent no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

impl ApiError {
    /// The message a UI surfaces for this failure: the server's own words
    /// when present, otherwise the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::Conflict(msg) => msg.clone(),
            ApiError::NotFound(msg) if !msg.trim().is_empty() => msg.clone(),
            ApiError::Unauthorized | ApiError::NotSignedIn => {
                "Please sign in and try again.".to_string()
            }
            ApiError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// True for the single-active-link business conflict, which the UI
    /// presents differently from generic failures.
    pub fn is_duplicate_link(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_carries_server_text_verbatim() {
        let err = ApiError::Api {
            status: 500,
            message: "Upload failed: file store unavailable".to_string(),
        };
        assert_eq!(err.user_message(), "Upload failed: file store unavailable");
    }

    #[test]
    fn test_user_message_falls_back_when_server_message_empty() {
        let err = ApiError::Api {
            status: 502,
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_duplicate_link_is_distinguishable() {
        let conflict = ApiError::Conflict("An active upload link already exists".to_string());
        assert!(conflict.is_duplicate_link());

        let generic = ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!generic.is_duplicate_link());
    }
}
