//! Payment settings and the bank-account verification flow.
//!
//! The payment provider integration lives entirely server-side; the client
//! sequences the admin-facing steps and observes the verification state.
//! Resolution cannot be skipped: `Confirmed` is only reachable through a
//! server-resolved account name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::MemoriaApi;
use crate::cache::PaymentsCache;
use crate::errors::ApiError;
use crate::models::user::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    Resolving,
    Resolved,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    pub school_id: Uuid,
    pub bank_code: String,
    pub account_number: String,
    #[serde(default)]
    pub account_name: Option<String>,
    pub verification: VerificationState,
    /// Platform's cut of access-code revenue, 0..=100.
    pub platform_share_percent: u8,
}

/// Bank account details as entered by the admin, validated before any
/// resolution request is made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_code: String,
    pub account_number: String,
}

impl BankAccount {
    /// NUBAN account numbers are exactly 10 digits; bank codes are numeric.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.bank_code.trim().is_empty() || !self.bank_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::Validation(
                "Select a bank before verifying the account".to_string(),
            ));
        }
        if self.account_number.len() != 10
            || !self.account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ApiError::Validation(
                "Account number must be exactly 10 digits".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccount {
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_share_percent: Option<u8>,
}

/// Client-observed verification state machine:
/// `Unverified -> Resolving -> Resolved(account_name) -> Confirmed`.
/// A failed resolution returns to `Unverified`.
#[derive(Debug)]
pub enum VerificationFlow {
    Unverified,
    Resolving {
        account: BankAccount,
    },
    Resolved {
        account: BankAccount,
        account_name: String,
    },
    Confirmed {
        account: BankAccount,
        account_name: String,
    },
}

impl VerificationFlow {
    pub fn new() -> Self {
        VerificationFlow::Unverified
    }

    pub fn state(&self) -> VerificationState {
        match self {
            VerificationFlow::Unverified => VerificationState::Unverified,
            VerificationFlow::Resolving { .. } => VerificationState::Resolving,
            VerificationFlow::Resolved { .. } => VerificationState::Resolved,
            VerificationFlow::Confirmed { .. } => VerificationState::Confirmed,
        }
    }

    /// Asks the server to resolve the account holder's name. On success the
    /// flow holds the resolved name for the admin to confirm; on failure it
    /// returns to `Unverified` and the error is surfaced.
    pub async fn resolve(
        &mut self,
        api: &dyn MemoriaApi,
        session: &Session,
        account: BankAccount,
    ) -> Result<String, ApiError> {
        account.validate()?;
        *self = VerificationFlow::Resolving {
            account: account.clone(),
        };

        match api
            .resolve_account(&session.token, session.school_id, &account)
            .await
        {
            Ok(resolved) => {
                tracing::info!(school_id = %session.school_id, "Bank account resolved");
                let name = resolved.account_name.clone();
                *self = VerificationFlow::Resolved {
                    account,
                    account_name: resolved.account_name,
                };
                Ok(name)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Bank account resolution failed");
                *self = VerificationFlow::Unverified;
                Err(err)
            }
        }
    }

    /// Persists the resolved account. Only legal from `Resolved`.
    pub async fn confirm(
        &mut self,
        api: &dyn MemoriaApi,
        cache: &PaymentsCache,
        session: &Session,
    ) -> Result<PaymentSettings, ApiError> {
        let (account, account_name) = match self {
            VerificationFlow::Resolved {
                account,
                account_name,
            } => (account.clone(), account_name.clone()),
            _ => {
                return Err(ApiError::Validation(
                    "Resolve the account before confirming".to_string(),
                ))
            }
        };

        let update = PaymentSettingsUpdate {
            bank_code: Some(account.bank_code.clone()),
            account_number: Some(account.account_number.clone()),
            account_name: Some(account_name.clone()),
            platform_share_percent: None,
        };
        let settings = api
            .update_payment_settings(&session.token, session.school_id, &update)
            .await?;

        cache.invalidate(&session.school_id);
        *self = VerificationFlow::Confirmed {
            account,
            account_name,
        };
        Ok(settings)
    }
}

impl Default for VerificationFlow {
    fn default() -> Self {
        VerificationFlow::new()
    }
}

/// Read-through fetch of a school's payment settings.
pub async fn settings(
    api: &dyn MemoriaApi,
    cache: &PaymentsCache,
    session: &Session,
) -> Result<PaymentSettings, ApiError> {
    if let Some(cached) = cache.get(&session.school_id) {
        return Ok(cached);
    }
    let fetched = api
        .payment_settings(&session.token, session.school_id)
        .await?;
    cache.put(session.school_id, fetched.clone());
    Ok(fetched)
}

/// Updates the revenue split and invalidates the cached settings.
pub async fn update_split(
    api: &dyn MemoriaApi,
    cache: &PaymentsCache,
    session: &Session,
    platform_share_percent: u8,
) -> Result<PaymentSettings, ApiError> {
    if platform_share_percent > 100 {
        return Err(ApiError::Validation(
            "Revenue share must be between 0 and 100 percent".to_string(),
        ));
    }
    let update = PaymentSettingsUpdate {
        bank_code: None,
        account_number: None,
        account_name: None,
        platform_share_percent: Some(platform_share_percent),
    };
    let settings = api
        .update_payment_settings(&session.token, session.school_id, &update)
        .await?;
    cache.invalidate(&session.school_id);
    Ok(settings)
}
