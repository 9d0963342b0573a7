use std::{fmt::Display, str::FromStr};

use cybersource_payment_engine::db_types::{PaymentProvider, ProviderState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The manual transitions that admins can apply to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Done,
    Cancel,
    Error,
    Capture,
}

impl FromStr for TransactionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(Self::Done),
            "cancel" => Ok(Self::Cancel),
            "error" => Ok(Self::Error),
            "capture" => Ok(Self::Capture),
            _ => Err(format!("{s} is not a valid transaction action. Use one of done, cancel, error or capture.")),
        }
    }
}

/// The provider record as returned by the admin API. Secrets are never included, only whether they are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub code: String,
    pub name: String,
    pub state: ProviderState,
    pub merchant_id: String,
    pub key_id: String,
    pub has_secret_key: bool,
    pub capture_manually: bool,
    pub timeout_secs: i64,
    pub missing_credentials: Vec<String>,
}

impl From<PaymentProvider> for ProviderSummary {
    fn from(p: PaymentProvider) -> Self {
        let missing_credentials = p.missing_credentials().into_iter().map(String::from).collect();
        Self {
            has_secret_key: !p.secret_key.is_empty(),
            code: p.code,
            name: p.name,
            state: p.state,
            merchant_id: p.merchant_id,
            key_id: p.key_id,
            capture_manually: p.capture_manually,
            timeout_secs: p.timeout_secs,
            missing_credentials,
        }
    }
}
