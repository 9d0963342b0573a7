use thiserror::Error;

#[derive(Debug, Error)]
pub enum CyberSourceApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The shared secret is not a valid base64 string: {0}")]
    InvalidSecretKey(String),
    #[error("Could not build request headers: {0}")]
    InvalidHeader(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("The request to CyberSource timed out: {0}")]
    Timeout(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not serialize JSON: {0}")]
    JsonError(String),
    #[error("CyberSource returned an unreadable response. Status {status}. {message}")]
    InvalidResponse { status: u16, message: String },
}
