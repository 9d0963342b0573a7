use crate::{
    db_types::{NewTransaction, PaymentTransaction, StateChange, TransactionState},
    traits::DatabaseError,
};

/// A state transition to write for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    pub old_state: TransactionState,
    pub new_state: TransactionState,
    pub message: Option<String>,
}

impl StateUpdate {
    pub fn new(old_state: TransactionState, new_state: TransactionState, message: Option<String>) -> Self {
        Self { old_state, new_state, message }
    }
}

#[allow(async_fn_in_trait)]
pub trait TransactionManagement {
    /// Stores a new transaction in the `draft` state.
    ///
    /// Returns [`DatabaseError::TransactionAlreadyExists`] if the reference is already taken.
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<PaymentTransaction, DatabaseError>;

    async fn fetch_transaction(&self, reference: &str) -> Result<Option<PaymentTransaction>, DatabaseError>;

    /// Fetches the transaction with the given reference, but only if it belongs to `provider_code`.
    async fn fetch_transaction_for_provider(
        &self,
        provider_code: &str,
        reference: &str,
    ) -> Result<Option<PaymentTransaction>, DatabaseError>;

    async fn set_provider_reference(
        &self,
        transaction_id: i64,
        provider_reference: &str,
    ) -> Result<PaymentTransaction, DatabaseError>;

    /// Atomically moves the transaction from `update.old_state` to `update.new_state` and writes the audit log entry.
    ///
    /// Returns `None` if the transaction was no longer in `update.old_state`, in which case nothing is written.
    async fn update_transaction_state(
        &self,
        transaction_id: i64,
        update: StateUpdate,
    ) -> Result<Option<PaymentTransaction>, DatabaseError>;

    async fn mark_post_processed(&self, transaction_id: i64) -> Result<PaymentTransaction, DatabaseError>;

    /// The state changes of a transaction, oldest first.
    async fn fetch_state_history(&self, transaction_id: i64) -> Result<Vec<StateChange>, DatabaseError>;
}
