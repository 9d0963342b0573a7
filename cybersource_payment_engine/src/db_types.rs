//! Data types for the order-system records that the payment engine reads and writes.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use cpg_common::Secret;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------      Partner        ---------------------------------------------------------
/// The payer. Only the id is mandatory. The remaining fields are used to fill in the billing details of a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Partner {
    pub id: i64,
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub zip: Option<String>,
    pub country_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPartner {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub zip: Option<String>,
    pub country_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewPartner {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }

    pub fn with_address(mut self, street: &str, city: &str, state_code: &str, zip: &str, country_code: &str) -> Self {
        self.street = Some(street.to_string());
        self.city = Some(city.to_string());
        self.state_code = Some(state_code.to_string());
        self.zip = Some(zip.to_string());
        self.country_code = Some(country_code.to_string());
        self
    }

    pub fn with_contact(mut self, email: &str, phone: &str) -> Self {
        self.email = Some(email.to_string());
        self.phone = Some(phone.to_string());
        self
    }
}

//--------------------------------------      Currency       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Currency {
    pub id: i64,
    /// The ISO 4217 code, e.g. `USD`
    pub name: String,
    pub symbol: String,
    pub active: bool,
}

//--------------------------------------    ProviderState    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ProviderState {
    /// The provider may not be used
    #[default]
    Disabled,
    /// Requests are sent to the CyberSource sandbox
    Test,
    /// Requests are sent to the live CyberSource environment
    Enabled,
}

impl Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderState::Disabled => write!(f, "disabled"),
            ProviderState::Test => write!(f, "test"),
            ProviderState::Enabled => write!(f, "enabled"),
        }
    }
}

impl FromStr for ProviderState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "test" => Ok(Self::Test),
            "enabled" => Ok(Self::Enabled),
            s => Err(ConversionError(format!("Invalid provider state: {s}"))),
        }
    }
}

//--------------------------------------   PaymentProvider   ---------------------------------------------------------
/// The merchant credential record used to sign gateway calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProvider {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub state: ProviderState,
    pub merchant_id: String,
    pub key_id: String,
    pub secret_key: Secret<String>,
    pub capture_manually: bool,
    pub timeout_secs: i64,
    pub updated_at: DateTime<Utc>,
}

impl PaymentProvider {
    /// The names of the credentials that have not been filled in yet.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::with_capacity(3);
        if self.merchant_id.trim().is_empty() {
            missing.push("merchant id");
        }
        if self.key_id.trim().is_empty() {
            missing.push("key id");
        }
        if self.secret_key.is_empty() {
            missing.push("secret key");
        }
        missing
    }
}

/// A partial update of a provider record. `None` fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderUpdate {
    pub merchant_id: Option<String>,
    pub key_id: Option<String>,
    pub secret_key: Option<Secret<String>>,
    pub state: Option<ProviderState>,
    pub capture_manually: Option<bool>,
    pub timeout_secs: Option<i64>,
}

impl ProviderUpdate {
    pub fn is_empty(&self) -> bool {
        self.merchant_id.is_none()
            && self.key_id.is_none()
            && self.secret_key.is_none()
            && self.state.is_none()
            && self.capture_manually.is_none()
            && self.timeout_secs.is_none()
    }

    pub fn with_credentials(mut self, merchant_id: &str, key_id: &str, secret_key: Secret<String>) -> Self {
        self.merchant_id = Some(merchant_id.to_string());
        self.key_id = Some(key_id.to_string());
        self.secret_key = Some(secret_key);
        self
    }

    pub fn with_state(mut self, state: ProviderState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_capture_manually(mut self, capture_manually: bool) -> Self {
        self.capture_manually = Some(capture_manually);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: i64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

//--------------------------------------  TransactionState   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TransactionState {
    /// The transaction has been created, but nothing has been heard from the gateway yet.
    #[default]
    Draft,
    /// The gateway has received the payment, but it has not been settled yet.
    Pending,
    /// The funds are reserved and wait for a manual capture.
    Authorized,
    /// The payment is complete.
    Done,
    /// The payment was declined or cancelled.
    Cancel,
    /// The gateway reported a state that could not be handled.
    Error,
}

impl TransactionState {
    /// The states a transaction may move into `self` from.
    pub fn allowed_sources(&self) -> &'static [TransactionState] {
        use TransactionState::*;
        match self {
            Draft => &[],
            Pending => &[Draft],
            Authorized => &[Draft, Pending],
            Done => &[Draft, Pending, Authorized, Error],
            Cancel => &[Draft, Pending, Authorized],
            Error => &[Draft, Pending, Authorized],
        }
    }

    pub fn can_transition_to(&self, target: TransactionState) -> bool {
        target.allowed_sources().contains(self)
    }
}

impl Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionState::Draft => "draft",
            TransactionState::Pending => "pending",
            TransactionState::Authorized => "authorized",
            TransactionState::Done => "done",
            TransactionState::Cancel => "cancel",
            TransactionState::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TransactionState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "authorized" => Ok(Self::Authorized),
            "done" => Ok(Self::Done),
            "cancel" | "canceled" | "cancelled" => Ok(Self::Cancel),
            "error" => Ok(Self::Error),
            s => Err(ConversionError(format!("Invalid transaction state: {s}"))),
        }
    }
}

//--------------------------------------      Operation      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    OnlineDirect,
    OnlineToken,
    Offline,
    Refund,
    Validation,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::OnlineDirect => "online_direct",
            Operation::OnlineToken => "online_token",
            Operation::Offline => "offline",
            Operation::Refund => "refund",
            Operation::Validation => "validation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Operation {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online_direct" => Ok(Self::OnlineDirect),
            "online_token" => Ok(Self::OnlineToken),
            "offline" => Ok(Self::Offline),
            "refund" => Ok(Self::Refund),
            "validation" => Ok(Self::Validation),
            s => Err(ConversionError(format!("Invalid operation: {s}"))),
        }
    }
}

//--------------------------------------  PaymentTransaction ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PaymentTransaction {
    pub id: i64,
    pub reference: String,
    pub provider_code: String,
    pub provider_reference: Option<String>,
    pub partner_id: Option<i64>,
    pub amount: f64,
    pub currency: String,
    pub operation: Operation,
    pub state: TransactionState,
    pub state_message: Option<String>,
    pub is_post_processed: bool,
    /// Taken from the provider record when the transaction is loaded
    pub capture_manually: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub reference: String,
    #[serde(default = "default_provider_code")]
    pub provider_code: String,
    #[serde(default)]
    pub partner_id: Option<i64>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub operation: Operation,
}

fn default_provider_code() -> String {
    cpg_common::CYBERSOURCE_PROVIDER_CODE.to_string()
}

impl NewTransaction {
    pub fn new<S: Into<String>>(reference: S, amount: f64, currency: &str) -> Self {
        Self {
            reference: reference.into(),
            provider_code: default_provider_code(),
            partner_id: None,
            amount,
            currency: currency.to_string(),
            operation: Operation::default(),
        }
    }

    pub fn with_partner(mut self, partner_id: i64) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_provider(mut self, provider_code: &str) -> Self {
        self.provider_code = provider_code.to_string();
        self
    }
}

//--------------------------------------     StateChange     ---------------------------------------------------------
/// Audit log entry for a transaction state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StateChange {
    pub id: i64,
    pub transaction_id: i64,
    pub old_state: TransactionState,
    pub new_state: TransactionState,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
