//! Wire types for the CyberSource `POST /pts/v2/payments` call.
use std::fmt::{Debug, Formatter};

use cpg_common::mask_card_number;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub client_reference_information: ClientReferenceInformation,
    pub processing_information: ProcessingInformation,
    pub payment_information: PaymentInformation,
    pub order_information: OrderInformation,
}

impl CreatePaymentRequest {
    /// A JSON rendition of the request that is safe to write to logs. The card number is masked and the security code
    /// is removed.
    pub fn masked(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Some(card) = value.pointer_mut("/paymentInformation/card") {
            card["number"] = Value::String(mask_card_number(&self.payment_information.card.number));
            card["securityCode"] = Value::String("***".into());
        }
        value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReferenceInformation {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingInformation {
    pub capture: bool,
    pub commerce_indicator: String,
}

impl Default for ProcessingInformation {
    fn default() -> Self {
        Self { capture: true, commerce_indicator: "internet".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInformation {
    pub card: Card,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub number: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub security_code: String,
    #[serde(rename = "type")]
    pub card_type: String,
}

impl Debug for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("number", &mask_card_number(&self.number))
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("security_code", &"***")
            .field("card_type", &self.card_type)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInformation {
    pub amount_details: AmountDetails,
    pub bill_to: BillTo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountDetails {
    pub total_amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTo {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub locality: String,
    pub administrative_area: String,
    pub postal_code: String,
    pub country: String,
    pub email: String,
    pub phone_number: String,
}

//--------------------------------------     GatewayResponse       ---------------------------------------------------
/// A response from the gateway. Declines arrive as ordinary responses (often with a 4xx status), so the status code and
/// body are kept together and interpreted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub http_status: u16,
    pub body: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInformation {
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl GatewayResponse {
    pub fn new(http_status: u16, body: Value) -> Self {
        Self { http_status, body }
    }

    /// The upper-cased `status` field of the response, or an empty string if there isn't one.
    pub fn status_label(&self) -> String {
        self.body.get("status").and_then(Value::as_str).map(|s| s.trim().to_uppercase()).unwrap_or_default()
    }

    /// The gateway's transaction id
    pub fn id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }

    pub fn is_http_success(&self) -> bool {
        matches!(self.http_status, 200 | 201)
    }

    /// Extracts the reason and message for a failed request.
    ///
    /// Declined authorizations carry an `errorInformation` object. Rejected requests (4xx) put `reason` and `message` at
    /// the top level of the body. Both spellings of the error object key are accepted.
    pub fn error_information(&self) -> ErrorInformation {
        let nested = self.body.get("errorInformation").or_else(|| self.body.get("error_information"));
        let field = |name: &str| -> Option<String> {
            nested
                .and_then(|e| e.get(name))
                .or_else(|| self.body.get(name))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        ErrorInformation { reason: field("reason"), message: field("message") }
    }
}
