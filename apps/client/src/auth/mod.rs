//! Sign-in flow: password check, 2FA challenge, session persistence.
//!
//! The server issues an opaque signed token at verification; that token is
//! the bearer credential for every authenticated call. Nothing else about
//! the user is ever sent for auth.

pub mod session;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::api::MemoriaApi;
use crate::auth::session::SessionStore;
use crate::errors::ApiError;
use crate::models::user::{Credentials, Session, TwoFactorChallenge};

/// Seconds between 2FA code sends.
pub const RESEND_COOLDOWN_SECS: i64 = 30;

/// Client-side gate on 2FA resends. Pure arithmetic against a
/// caller-supplied clock, so the countdown can be re-evaluated every
/// render tick without drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResendTimer {
    last_sent: DateTime<Utc>,
    cooldown: Duration,
}

impl ResendTimer {
    pub fn new(sent_at: DateTime<Utc>) -> Self {
        ResendTimer {
            last_sent: sent_at,
            cooldown: Duration::seconds(RESEND_COOLDOWN_SECS),
        }
    }

    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        now >= self.last_sent + self.cooldown
    }

    /// Whole seconds left on the countdown, zero once resend is allowed.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.last_sent + self.cooldown - now).num_seconds().max(0)
    }

    pub fn mark_sent(&mut self, now: DateTime<Utc>) {
        self.last_sent = now;
    }
}

/// A login awaiting its 2FA code.
#[derive(Debug)]
pub struct PendingLogin {
    pub challenge: TwoFactorChallenge,
    pub resend: ResendTimer,
}

/// Checks credentials. A success is not a session yet, only a challenge.
pub async fn login(
    api: &dyn MemoriaApi,
    credentials: &Credentials,
    now: DateTime<Utc>,
) -> Result<PendingLogin, ApiError> {
    let challenge = api.login(credentials).await?;
    info!(sent_to = %challenge.sent_to, "2FA challenge issued");
    Ok(PendingLogin {
        challenge,
        resend: ResendTimer::new(now),
    })
}

/// Requests another code, refused inside the cooldown window.
pub async fn resend(
    api: &dyn MemoriaApi,
    pending: &mut PendingLogin,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if !pending.resend.can_resend(now) {
        return Err(ApiError::Validation(format!(
            "Wait {}s before requesting another code",
            pending.resend.seconds_remaining(now)
        )));
    }
    api.resend_code(&pending.challenge.challenge_id).await?;
    pending.resend.mark_sent(now);
    Ok(())
}

/// Verifies the code, persists the issued session and returns it.
pub async fn verify(
    api: &dyn MemoriaApi,
    store: &SessionStore,
    pending: &PendingLogin,
    code: &str,
) -> Result<Session, ApiError> {
    let session = api
        .verify_code(&pending.challenge.challenge_id, code)
        .await?;
    store.save(&session)?;
    info!(user_id = %session.user_id, "Signed in");
    Ok(session)
}

/// Drops the persisted session. Purely local; the server-side token
/// lifetime is its own concern.
pub fn logout(store: &SessionStore) -> Result<(), ApiError> {
    store.clear()?;
    info!("Signed out");
    Ok(())
}
