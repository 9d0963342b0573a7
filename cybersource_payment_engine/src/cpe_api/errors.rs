use cybersource_tools::CyberSourceApiError;
use thiserror::Error;

use crate::traits::DatabaseError;

/// Problems with the payment request itself. These are reported to the payer as-is and nothing is sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentValidationError {
    #[error("The payment reference is missing.")]
    MissingReference,
    #[error("The customer related to this payment could not be found.")]
    PartnerNotFound,
    #[error("The currency configured for this payment is invalid.")]
    InvalidCurrency,
    #[error("The transaction amount is missing.")]
    MissingAmount,
    #[error("The transaction amount is invalid.")]
    InvalidAmount,
    #[error("Please provide the complete card details (number, expiry and CVV).")]
    IncompleteCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderApiError {
    #[error("No CyberSource provider is configured.")]
    NotConfigured,
    #[error("The CyberSource provider is missing the following credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("The CyberSource provider is disabled.")]
    Disabled,
    #[error("Invalid provider update: {0}")]
    InvalidUpdate(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DatabaseError> for ProviderApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::ProviderNotFound(_) => Self::NotConfigured,
            DatabaseError::InvalidData(s) => Self::InvalidUpdate(s),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionFlowError {
    #[error("CyberSource: the notification is missing the transaction reference.")]
    MissingReference,
    #[error("CyberSource: no transaction found matching reference {0}.")]
    TransactionNotFound(String),
    #[error("A transaction with reference {0} already exists.")]
    TransactionAlreadyExists(String),
    #[error("Transaction {0} cannot be post-processed in state {1}.")]
    NotReadyForPostProcessing(String, String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl TransactionFlowError {
    /// Whether this error was caused by the notification content rather than by the system.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::MissingReference | Self::TransactionNotFound(_))
    }
}

impl From<DatabaseError> for TransactionFlowError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::TransactionAlreadyExists(r) => Self::TransactionAlreadyExists(r),
            DatabaseError::TransactionNotFound(r) => Self::TransactionNotFound(r),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CardPaymentError {
    #[error("{0}")]
    Validation(#[from] PaymentValidationError),
    #[error("{0}")]
    Configuration(#[from] ProviderApiError),
    #[error("{0}")]
    Notification(#[from] TransactionFlowError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] CyberSourceApiError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DatabaseError> for CardPaymentError {
    fn from(e: DatabaseError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl CardPaymentError {
    pub const INTERNAL_ERROR_MESSAGE: &'static str = "An unexpected error occurred while contacting CyberSource.";

    /// The message that may be shown to the payer. Internal failures are replaced by a generic message.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Configuration(ProviderApiError::DatabaseError(_)) => Self::INTERNAL_ERROR_MESSAGE.to_string(),
            Self::Configuration(e) => e.to_string(),
            Self::Notification(e) if e.is_validation_error() => e.to_string(),
            _ => Self::INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}
