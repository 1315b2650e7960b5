use std::path::PathBuf;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform API, e.g. `https://api.memoria.school`.
    pub api_url: String,
    /// Where the signed-in session is persisted between runs.
    pub session_file: PathBuf,
    /// Request timeout applied to every call; there is no per-call override.
    pub http_timeout_secs: u64,
    pub rust_log: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(ClientConfig {
            api_url: require_env("MEMORIA_API_URL")?,
            session_file: std::env::var("MEMORIA_SESSION_FILE")
                .unwrap_or_else(|_| "memoria-session.json".to_string())
                .into(),
            http_timeout_secs: std::env::var("MEMORIA_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("MEMORIA_HTTP_TIMEOUT_SECS must be a number of seconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
