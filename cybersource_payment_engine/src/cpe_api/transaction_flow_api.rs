use std::fmt::Debug;

use cpg_common::CYBERSOURCE_PROVIDER_CODE;
use log::*;

use crate::{
    cpe_api::{
        errors::TransactionFlowError,
        payment_objects::{NotificationData, SimulatedState, TransactionDetails},
    },
    db_types::{NewTransaction, Operation, PaymentTransaction, StateChange, TransactionState},
    events::{EventProducers, PostProcessingRequestedEvent, TransactionStateChangedEvent},
    traits::{StateUpdate, TransactionManagement},
};

pub const DEFAULT_CANCEL_MESSAGE: &str = "Payment canceled by CyberSource.";

/// `TransactionFlowApi` applies gateway notifications to payment transactions.
///
/// A notification carries a [`SimulatedState`], which is mapped onto a transaction state as follows:
///
/// | Notification | Transaction state                                                                  |
/// |--------------|------------------------------------------------------------------------------------|
/// | `pending`    | `pending`                                                                          |
/// | `AUTHORIZED` | `authorized` if the provider captures manually (unless this is the capture itself), otherwise `done` |
/// | `DECLINED`   | `cancel`, with the notification message                                            |
/// | anything else| `error`                                                                            |
///
/// Transitions that are not allowed from the current state (see [`TransactionState::allowed_sources`]) are logged and
/// ignored. Every applied transition is written to the audit log and published as a
/// [`TransactionStateChangedEvent`].
pub struct TransactionFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for TransactionFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionFlowApi")
    }
}

impl<B> TransactionFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> TransactionFlowApi<B>
where B: TransactionManagement
{
    /// Registers a new transaction in the `draft` state. References are unique.
    pub async fn create_transaction(&self, tx: NewTransaction) -> Result<PaymentTransaction, TransactionFlowError> {
        let tx = self.db.insert_transaction(tx).await?;
        info!("🔄️ Transaction [{}] created for {} {}", tx.reference, tx.amount, tx.currency);
        Ok(tx)
    }

    pub async fn fetch_transaction(&self, reference: &str) -> Result<Option<PaymentTransaction>, TransactionFlowError> {
        let tx = self.db.fetch_transaction(reference).await?;
        Ok(tx)
    }

    pub async fn state_history(&self, reference: &str) -> Result<Vec<StateChange>, TransactionFlowError> {
        let tx = self.get_transaction(reference).await?;
        let history = self.db.fetch_state_history(tx.id).await?;
        Ok(history)
    }

    pub async fn transaction_details(&self, reference: &str) -> Result<TransactionDetails, TransactionFlowError> {
        let transaction = self.get_transaction(reference).await?;
        let history = self.db.fetch_state_history(transaction.id).await?;
        Ok(TransactionDetails { transaction, history })
    }

    async fn get_transaction(&self, reference: &str) -> Result<PaymentTransaction, TransactionFlowError> {
        self.db
            .fetch_transaction(reference)
            .await?
            .ok_or_else(|| TransactionFlowError::TransactionNotFound(reference.to_string()))
    }

    /// Finds the transaction a notification refers to and applies the notification to it.
    pub async fn handle_notification_data(
        &self,
        provider_code: &str,
        data: NotificationData,
    ) -> Result<PaymentTransaction, TransactionFlowError> {
        let reference = data
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(TransactionFlowError::MissingReference)?;
        let tx = self
            .db
            .fetch_transaction_for_provider(provider_code, reference)
            .await?
            .ok_or_else(|| TransactionFlowError::TransactionNotFound(reference.to_string()))?;
        debug!("🔄️ Notification '{}' received for transaction [{reference}]", data.simulated_state);
        self.process_notification_data(tx, data).await
    }

    async fn process_notification_data(
        &self,
        tx: PaymentTransaction,
        data: NotificationData,
    ) -> Result<PaymentTransaction, TransactionFlowError> {
        if tx.provider_code != CYBERSOURCE_PROVIDER_CODE {
            debug!("🔄️ Transaction [{}] belongs to {}. Notification ignored.", tx.reference, tx.provider_code);
            return Ok(tx);
        }
        let provider_reference = format!("{CYBERSOURCE_PROVIDER_CODE}-{}", tx.reference);
        let tx = self.db.set_provider_reference(tx.id, &provider_reference).await?;
        match data.simulated_state {
            SimulatedState::Pending => self.transition(tx, TransactionState::Pending, None).await,
            SimulatedState::Authorized if tx.capture_manually && !data.manual_capture => {
                self.transition(tx, TransactionState::Authorized, None).await
            },
            SimulatedState::Authorized => {
                let tx = self.transition(tx, TransactionState::Done, None).await?;
                if tx.state == TransactionState::Done && tx.operation == Operation::Refund {
                    self.call_post_processing_hook(&tx).await;
                }
                Ok(tx)
            },
            SimulatedState::Declined => {
                let message = data
                    .message
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_CANCEL_MESSAGE.to_string());
                self.transition(tx, TransactionState::Cancel, Some(message)).await
            },
            SimulatedState::Error(label) => {
                let message = format!("CyberSource returned the state: {label}");
                self.transition(tx, TransactionState::Error, Some(message)).await
            },
        }
    }

    async fn transition(
        &self,
        tx: PaymentTransaction,
        new_state: TransactionState,
        message: Option<String>,
    ) -> Result<PaymentTransaction, TransactionFlowError> {
        let old_state = tx.state;
        if !old_state.can_transition_to(new_state) {
            warn!(
                "🔄️ Transaction [{}] cannot move from {old_state} to {new_state}. The state change is ignored.",
                tx.reference
            );
            return Ok(tx);
        }
        let update = StateUpdate::new(old_state, new_state, message);
        match self.db.update_transaction_state(tx.id, update).await? {
            Some(updated) => {
                info!("🔄️ Transaction [{}] moved from {old_state} to {new_state}", updated.reference);
                self.call_state_changed_hook(old_state, &updated).await;
                Ok(updated)
            },
            None => {
                warn!("🔄️ Transaction [{}] changed state concurrently. The state change is ignored.", tx.reference);
                let current = self.db.fetch_transaction(&tx.reference).await?;
                Ok(current.unwrap_or(tx))
            },
        }
    }

    async fn call_state_changed_hook(&self, old_state: TransactionState, tx: &PaymentTransaction) {
        for emitter in &self.producers.state_changed_producer {
            debug!("🔄️ Notifying state change hook subscribers");
            let event = TransactionStateChangedEvent::new(old_state, tx.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_post_processing_hook(&self, tx: &PaymentTransaction) {
        for emitter in &self.producers.post_processing_producer {
            debug!("🔄️ Requesting post-processing for [{}]", tx.reference);
            emitter.publish_event(PostProcessingRequestedEvent::new(tx.clone())).await;
        }
    }

    /// Marks the transaction as paid, as if CyberSource had authorized it.
    pub async fn set_done(&self, reference: &str) -> Result<PaymentTransaction, TransactionFlowError> {
        self.simulate_notification(reference, SimulatedState::Authorized).await
    }

    /// Cancels the transaction, as if CyberSource had declined it.
    pub async fn set_canceled(&self, reference: &str) -> Result<PaymentTransaction, TransactionFlowError> {
        self.simulate_notification(reference, SimulatedState::Declined).await
    }

    pub async fn set_error(&self, reference: &str) -> Result<PaymentTransaction, TransactionFlowError> {
        self.simulate_notification(reference, SimulatedState::Error("error".into())).await
    }

    /// Confirms the capture of an authorized transaction.
    pub async fn capture(&self, reference: &str) -> Result<PaymentTransaction, TransactionFlowError> {
        let tx = self.get_transaction(reference).await?;
        if tx.provider_code != CYBERSOURCE_PROVIDER_CODE {
            return Ok(tx);
        }
        let data = NotificationData::new(reference, SimulatedState::Authorized).with_manual_capture();
        self.handle_notification_data(CYBERSOURCE_PROVIDER_CODE, data).await
    }

    async fn simulate_notification(
        &self,
        reference: &str,
        state: SimulatedState,
    ) -> Result<PaymentTransaction, TransactionFlowError> {
        let tx = self.get_transaction(reference).await?;
        if tx.provider_code != CYBERSOURCE_PROVIDER_CODE {
            debug!("🔄️ [{reference}] is not a CyberSource transaction. Nothing to do.");
            return Ok(tx);
        }
        let data = NotificationData::new(reference, state);
        self.handle_notification_data(CYBERSOURCE_PROVIDER_CODE, data).await
    }

    /// Completes the follow-up processing of a `done` transaction. Transactions that were already post-processed are
    /// returned unchanged.
    pub async fn post_process(&self, reference: &str) -> Result<PaymentTransaction, TransactionFlowError> {
        let tx = self.get_transaction(reference).await?;
        if tx.state != TransactionState::Done {
            return Err(TransactionFlowError::NotReadyForPostProcessing(tx.reference, tx.state.to_string()));
        }
        if tx.is_post_processed {
            trace!("🔄️ [{reference}] has already been post-processed");
            return Ok(tx);
        }
        let tx = self.db.mark_post_processed(tx.id).await?;
        info!("🔄️ Transaction [{reference}] post-processed");
        Ok(tx)
    }
}
