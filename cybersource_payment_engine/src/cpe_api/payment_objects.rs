use std::fmt::{Debug, Display, Formatter};

use cpg_common::mask_card_number;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::db_types::{PaymentTransaction, StateChange};

//--------------------------------------      FlexValue       --------------------------------------------------------
/// Checkout pages send ids, amounts and expiry dates either as JSON numbers or as strings. Both are accepted.
///
/// `UInt` catches integers above `i64::MAX` (19-digit card numbers) before they can fall through to `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl FlexValue {
    /// The value as text, without any trimming.
    pub fn as_text(&self) -> String {
        match self {
            FlexValue::Int(v) => v.to_string(),
            FlexValue::UInt(v) => v.to_string(),
            FlexValue::Float(v) => v.to_string(),
            FlexValue::Text(s) => s.clone(),
        }
    }

    /// The value as text, for fields that must be digits exactly as entered. Floats are refused, since their text
    /// form may not match what the customer typed.
    pub fn as_exact_text(&self) -> Option<String> {
        match self {
            FlexValue::Float(_) => None,
            v => Some(v.as_text()),
        }
    }

    /// Interprets the value as a record id.
    pub fn as_id(&self) -> Option<i64> {
        match self {
            FlexValue::Int(v) => Some(*v),
            FlexValue::UInt(v) => i64::try_from(*v).ok(),
            FlexValue::Float(_) => None,
            FlexValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Display for FlexValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for FlexValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for FlexValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FlexValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

//--------------------------------------    PaymentRequest    --------------------------------------------------------
/// A card payment request, as posted by the checkout page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub reference: Option<FlexValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: PaymentValues,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_input: CustomerInput,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PaymentRequest {
    /// The trimmed reference, if there is a non-empty one.
    pub fn reference(&self) -> Option<String> {
        self.reference.as_ref().map(|r| r.as_text().trim().to_string()).filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentValues {
    /// The payer's id
    #[serde(default)]
    pub partner: Option<FlexValue>,
    /// The currency id
    #[serde(default)]
    pub currency: Option<FlexValue>,
    #[serde(default)]
    pub amount: Option<FlexValue>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub card_num: Option<FlexValue>,
    #[serde(default)]
    pub exp_month: Option<FlexValue>,
    #[serde(default)]
    pub exp_year: Option<FlexValue>,
    #[serde(default)]
    pub cvv: Option<FlexValue>,
    /// An explicit CyberSource card type code (e.g. `002`). Overrides the type derived from the card number.
    #[serde(default, rename = "type")]
    pub card_type: Option<FlexValue>,
}

impl Debug for CustomerInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let number = self.card_num.as_ref().map(|n| mask_card_number(&n.as_text()));
        f.debug_struct("CustomerInput")
            .field("card_num", &number)
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvv", &self.cvv.as_ref().map(|_| "***"))
            .field("card_type", &self.card_type)
            .finish()
    }
}

//--------------------------------------    PaymentOutcome    --------------------------------------------------------
/// The answer to a payment request. `status`, `reason` and `data` are omitted from the JSON when they are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PaymentOutcome {
    pub const APPROVED_MESSAGE: &'static str = "The payment has been authorized.";

    pub fn approved(status: String, data: Value) -> Self {
        Self {
            success: true,
            message: Self::APPROVED_MESSAGE.to_string(),
            status: Some(status),
            reason: None,
            data: Some(data),
        }
    }

    pub fn declined(status: String, reason: String, message: String, data: Value) -> Self {
        Self { success: false, message, status: Some(status), reason: Some(reason), data: Some(data) }
    }

    /// A failure that happened before (or instead of) talking to the gateway.
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self { success: false, message: message.into(), status: None, reason: None, data: None }
    }
}

//--------------------------------------    SimulatedState    --------------------------------------------------------
/// The verdict on a gateway response, as consumed by the transaction flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SimulatedState {
    Pending,
    Authorized,
    Declined,
    /// Anything else. Carries the label that was received.
    Error(String),
}

impl SimulatedState {
    pub fn label(&self) -> &str {
        match self {
            SimulatedState::Pending => "pending",
            SimulatedState::Authorized => "AUTHORIZED",
            SimulatedState::Declined => "DECLINED",
            SimulatedState::Error(label) => label.as_str(),
        }
    }
}

impl From<&str> for SimulatedState {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "authorized" => Self::Authorized,
            "declined" => Self::Declined,
            _ => Self::Error(value.to_string()),
        }
    }
}

impl From<String> for SimulatedState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SimulatedState> for String {
    fn from(value: SimulatedState) -> Self {
        value.label().to_string()
    }
}

impl Display for SimulatedState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

//--------------------------------------   NotificationData   --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default)]
    pub reference: Option<String>,
    pub simulated_state: SimulatedState,
    #[serde(default)]
    pub message: Option<String>,
    /// Set when the notification confirms a manual capture of an authorized payment
    #[serde(default)]
    pub manual_capture: bool,
}

impl NotificationData {
    pub fn new<S: Into<String>>(reference: S, simulated_state: SimulatedState) -> Self {
        Self { reference: Some(reference.into()), simulated_state, message: None, manual_capture: false }
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_manual_capture(mut self) -> Self {
        self.manual_capture = true;
        self
    }
}

//--------------------------------------  TransactionDetails  --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction: PaymentTransaction,
    pub history: Vec<StateChange>,
}
