use cybersource_payment_engine::{
    db_types::{NewTransaction, Operation, ProviderUpdate},
    ProviderManagement,
};
use cucumber::given;

use crate::cucumber::{payment_world::PaymentSystem, PaymentWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut PaymentWorld) {
    let system = PaymentSystem::new().await;
    world.system = Some(system);
}

#[given("the CyberSource provider captures payments manually")]
async fn manual_capture(world: &mut PaymentWorld) {
    let update = ProviderUpdate::default().with_capture_manually(true);
    world.db().update_provider("cybersource", update).await.expect("Error updating provider");
}

#[given(expr = "a transaction {word} for {int} {word}")]
async fn new_transaction(world: &mut PaymentWorld, reference: String, amount: i64, currency: String) {
    let tx = NewTransaction::new(reference, amount as f64, &currency);
    world.api().create_transaction(tx).await.expect("Error creating transaction");
}

#[given(expr = "a transaction {word} for {int} {word} with provider {word}")]
async fn new_transaction_for_provider(
    world: &mut PaymentWorld,
    reference: String,
    amount: i64,
    currency: String,
    provider: String,
) {
    let tx = NewTransaction::new(reference, amount as f64, &currency).with_provider(&provider);
    world.api().create_transaction(tx).await.expect("Error creating transaction");
}

#[given(expr = "a refund transaction {word} for {int} {word}")]
async fn new_refund(world: &mut PaymentWorld, reference: String, amount: i64, currency: String) {
    let tx = NewTransaction::new(reference, amount as f64, &currency).with_operation(Operation::Refund);
    world.api().create_transaction(tx).await.expect("Error creating transaction");
}
