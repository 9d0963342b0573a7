//! Builds the CyberSource payment request from a validated payment request.
use cybersource_tools::data_objects::{
    AmountDetails,
    BillTo,
    ClientReferenceInformation,
    CreatePaymentRequest,
    OrderInformation,
    PaymentInformation,
    ProcessingInformation,
};

use crate::{
    cpe_api::card::CardDetails,
    db_types::{Currency, Partner},
};

pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_NAME: &str = "Customer";
pub const DEFAULT_ADDRESS: &str = "N/A";
pub const DEFAULT_POSTAL_CODE: &str = "00000";
pub const DEFAULT_EMAIL: &str = "customer@example.com";
pub const DEFAULT_PHONE: &str = "0000000000";

/// Deployment options for the card payment adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Billing country used when the payer has none
    pub default_country: String,
    /// Log the masked outbound payload and the gateway response at debug level
    pub log_payloads: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self { default_country: DEFAULT_COUNTRY.to_string(), log_payloads: false }
    }
}

/// Splits a full name into first and last names. A single-word name is used for both.
pub fn split_name(name: Option<&str>) -> (String, String) {
    let mut words = name.unwrap_or_default().split_whitespace();
    let first = words.next().unwrap_or(DEFAULT_NAME).to_string();
    let last = words.last().map(str::to_string).unwrap_or_else(|| first.clone());
    (first, last)
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default).to_string()
}

pub fn bill_to(partner: &Partner, options: &AdapterOptions) -> BillTo {
    let (first_name, last_name) = split_name(partner.name.as_deref());
    BillTo {
        first_name,
        last_name,
        address1: or_default(&partner.street, DEFAULT_ADDRESS),
        locality: or_default(&partner.city, DEFAULT_ADDRESS),
        administrative_area: or_default(&partner.state_code, DEFAULT_ADDRESS),
        postal_code: or_default(&partner.zip, DEFAULT_POSTAL_CODE),
        country: or_default(&partner.country_code, &options.default_country),
        email: or_default(&partner.email, DEFAULT_EMAIL),
        phone_number: or_default(&partner.phone, DEFAULT_PHONE),
    }
}

pub fn build_payment_request(
    reference: &str,
    amount: &str,
    currency: &Currency,
    partner: &Partner,
    card: &CardDetails,
    options: &AdapterOptions,
) -> CreatePaymentRequest {
    CreatePaymentRequest {
        client_reference_information: ClientReferenceInformation { code: reference.to_string() },
        processing_information: ProcessingInformation::default(),
        payment_information: PaymentInformation { card: card.to_gateway_card() },
        order_information: OrderInformation {
            amount_details: AmountDetails { total_amount: amount.to_string(), currency: currency.name.clone() },
            bill_to: bill_to(partner, options),
        },
    }
}
