use cybersource_payment_engine::{
    db_types::{PaymentTransaction, TransactionState},
    payment_objects::{NotificationData, SimulatedState},
    TransactionManagement,
};
use cucumber::{then, when};

use crate::cucumber::PaymentWorld;

async fn fetch_tx(world: &PaymentWorld, reference: &str) -> PaymentTransaction {
    world.db().fetch_transaction(reference).await.expect("Error fetching transaction").expect("No such transaction")
}

#[when(expr = "CyberSource notifies {string} for {word}")]
async fn notify(world: &mut PaymentWorld, state: String, reference: String) {
    let data = NotificationData::new(reference, SimulatedState::from(state));
    world.api().handle_notification_data("cybersource", data).await.expect("Error handling notification");
}

#[when(expr = "CyberSource declines {word} with message {string}")]
async fn decline(world: &mut PaymentWorld, reference: String, message: String) {
    let data = NotificationData::new(reference, SimulatedState::Declined).with_message(message);
    world.api().handle_notification_data("cybersource", data).await.expect("Error handling notification");
}

#[when(expr = "an admin marks {word} as {word}")]
async fn admin_action(world: &mut PaymentWorld, reference: String, action: String) {
    let api = world.api();
    let result = match action.as_str() {
        "done" => api.set_done(&reference).await,
        "canceled" => api.set_canceled(&reference).await,
        "error" => api.set_error(&reference).await,
        a => panic!("Unknown admin action: {a}"),
    };
    result.expect("Admin action failed");
}

#[when(expr = "an admin captures {word}")]
async fn admin_capture(world: &mut PaymentWorld, reference: String) {
    world.api().capture(&reference).await.expect("Capture failed");
}

#[when(expr = "transaction {word} is post-processed")]
async fn post_process(world: &mut PaymentWorld, reference: String) {
    world.api().post_process(&reference).await.expect("Post-processing failed");
}

#[then(expr = "transaction {word} is in state {word}")]
async fn check_state(world: &mut PaymentWorld, reference: String, state: String) {
    let expected = state.parse::<TransactionState>().expect("Invalid state");
    let tx = fetch_tx(world, &reference).await;
    assert_eq!(tx.state, expected, "Transaction {reference} is in the wrong state");
}

#[then(expr = "transaction {word} has state message {string}")]
async fn check_message(world: &mut PaymentWorld, reference: String, message: String) {
    let tx = fetch_tx(world, &reference).await;
    assert_eq!(tx.state_message.as_deref(), Some(message.as_str()));
}

#[then(expr = "transaction {word} has provider reference {string}")]
async fn check_provider_reference(world: &mut PaymentWorld, reference: String, provider_reference: String) {
    let tx = fetch_tx(world, &reference).await;
    assert_eq!(tx.provider_reference.as_deref(), Some(provider_reference.as_str()));
}

#[then(expr = "transaction {word} has {int} state changes")]
async fn check_history(world: &mut PaymentWorld, reference: String, count: usize) {
    let history = world.api().state_history(&reference).await.expect("Error fetching history");
    assert_eq!(history.len(), count, "Unexpected number of state changes: {history:?}");
}

#[then(expr = "transaction {word} is marked as post-processed")]
async fn check_post_processed(world: &mut PaymentWorld, reference: String) {
    assert!(fetch_tx(world, &reference).await.is_post_processed);
}

#[then(expr = "a notification without a reference is rejected with {string}")]
async fn notification_without_reference(world: &mut PaymentWorld, message: String) {
    let data = NotificationData {
        reference: None,
        simulated_state: SimulatedState::Authorized,
        message: None,
        manual_capture: false,
    };
    let err = world.api().handle_notification_data("cybersource", data).await.expect_err("Expected an error");
    assert_eq!(err.to_string(), message);
}

#[then(expr = "a notification for {word} is rejected with {string}")]
async fn notification_for_unknown(world: &mut PaymentWorld, reference: String, message: String) {
    let data = NotificationData::new(reference, SimulatedState::Authorized);
    let err = world.api().handle_notification_data("cybersource", data).await.expect_err("Expected an error");
    assert_eq!(err.to_string(), message);
}
