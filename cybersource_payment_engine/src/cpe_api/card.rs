//! Card data normalization and network classification.
use std::fmt::{Debug, Display, Formatter};

use cpg_common::{mask_card_number, Secret};
use cybersource_tools::data_objects::Card;

use crate::cpe_api::{
    errors::PaymentValidationError,
    payment_objects::{CustomerInput, FlexValue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Unknown,
}

impl CardNetwork {
    /// Classifies a (whitespace-free) card number by its prefix.
    pub fn classify(number: &str) -> Self {
        let prefix = number.get(..2).and_then(|p| p.parse::<u8>().ok());
        match prefix {
            _ if number.starts_with('4') => Self::Visa,
            Some(51..=55) => Self::Mastercard,
            Some(34) | Some(37) => Self::Amex,
            _ => Self::Unknown,
        }
    }

    /// The CyberSource card type code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Visa => "001",
            Self::Mastercard => "002",
            Self::Amex => "003",
            Self::Unknown => "000",
        }
    }
}

impl Display for CardNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visa => write!(f, "Visa"),
            Self::Mastercard => write!(f, "Mastercard"),
            Self::Amex => write!(f, "American Express"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Card data, normalized and ready to be sent to the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    number: String,
    exp_month: String,
    exp_year: String,
    security_code: Secret<String>,
    card_type: String,
}

impl CardDetails {
    pub fn from_input(input: &CustomerInput) -> Result<Self, PaymentValidationError> {
        let text = |v: &Option<FlexValue>| v.as_ref().and_then(FlexValue::as_exact_text);
        let number = text(&input.card_num).unwrap_or_default().split_whitespace().collect::<String>();
        let exp_month = text(&input.exp_month).unwrap_or_default().trim().to_string();
        let exp_year = text(&input.exp_year).unwrap_or_default().trim().to_string();
        let cvv = text(&input.cvv).unwrap_or_default().trim().to_string();
        if number.is_empty() || exp_month.is_empty() || exp_year.is_empty() || cvv.is_empty() {
            return Err(PaymentValidationError::IncompleteCard);
        }
        let exp_month = format!("{exp_month:0>2}");
        let card_type = text(&input.card_type)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| CardNetwork::classify(&number).code().to_string());
        Ok(Self { number, exp_month, exp_year, security_code: Secret::new(cvv), card_type })
    }

    pub fn masked_number(&self) -> String {
        mask_card_number(&self.number)
    }

    pub fn card_type(&self) -> &str {
        &self.card_type
    }

    pub fn exp_month(&self) -> &str {
        &self.exp_month
    }

    pub fn exp_year(&self) -> &str {
        &self.exp_year
    }

    pub fn to_gateway_card(&self) -> Card {
        Card {
            number: self.number.clone(),
            expiration_month: self.exp_month.clone(),
            expiration_year: self.exp_year.clone(),
            security_code: self.security_code.reveal().clone(),
            card_type: self.card_type.clone(),
        }
    }
}

impl Debug for CardDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &self.masked_number())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("security_code", &self.security_code)
            .field("card_type", &self.card_type)
            .finish()
    }
}
