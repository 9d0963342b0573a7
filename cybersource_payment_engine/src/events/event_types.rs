use serde::{Deserialize, Serialize};

use crate::db_types::{PaymentTransaction, TransactionState};

/// Emitted after every applied transaction state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStateChangedEvent {
    pub old_state: TransactionState,
    pub transaction: PaymentTransaction,
}

impl TransactionStateChangedEvent {
    pub fn new(old_state: TransactionState, transaction: PaymentTransaction) -> Self {
        Self { old_state, transaction }
    }

    pub fn new_state(&self) -> TransactionState {
        self.transaction.state
    }
}

/// Emitted when a completed transaction needs follow-up processing (e.g. a confirmed refund).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessingRequestedEvent {
    pub transaction: PaymentTransaction,
}

impl PostProcessingRequestedEvent {
    pub fn new(transaction: PaymentTransaction) -> Self {
        Self { transaction }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventType {
    TransactionStateChanged(TransactionStateChangedEvent),
    PostProcessingRequested(PostProcessingRequestedEvent),
}
