use thiserror::Error;

use crate::traits::{PartnerManagement, ProviderManagement, TransactionManagement};

/// The highest level of behaviour for backends supporting the CyberSource payment engine.
#[allow(async_fn_in_trait)]
pub trait PaymentsDatabase: Clone + PartnerManagement + ProviderManagement + TransactionManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes all connections to the database.
    async fn close(&mut self) -> Result<(), DatabaseError>;
}

#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert transaction, since it already exists with reference {0}")]
    TransactionAlreadyExists(String),
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(String),
    #[error("The requested payment provider {0} does not exist")]
    ProviderNotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        DatabaseError::DatabaseError(e.to_string())
    }
}
