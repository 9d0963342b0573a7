use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use cybersource_payment_engine::{ProviderApiError, TransactionFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with existing data. {0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<TransactionFlowError> for ServerError {
    fn from(e: TransactionFlowError) -> Self {
        match e {
            TransactionFlowError::TransactionNotFound(_) => Self::NoRecordFound(e.to_string()),
            TransactionFlowError::TransactionAlreadyExists(_) => Self::Conflict(e.to_string()),
            TransactionFlowError::NotReadyForPostProcessing(_, _) => Self::Conflict(e.to_string()),
            TransactionFlowError::MissingReference => Self::InvalidRequestBody(e.to_string()),
            TransactionFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<ProviderApiError> for ServerError {
    fn from(e: ProviderApiError) -> Self {
        match e {
            ProviderApiError::NotConfigured => Self::NoRecordFound(e.to_string()),
            ProviderApiError::InvalidUpdate(_) => Self::InvalidRequestBody(e.to_string()),
            ProviderApiError::MissingCredentials(_) | ProviderApiError::Disabled => {
                Self::ConfigurationError(e.to_string())
            },
            ProviderApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
