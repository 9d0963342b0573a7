use std::sync::{
    atomic::{AtomicI32, Ordering},
    Arc,
};

use cybersource_payment_engine::{
    db_types::{NewTransaction, Operation, TransactionState},
    events::{EventHandlers, EventHooks, EventProducers},
    TransactionFlowApi,
};
use futures_util::future::join;
use log::*;

mod support;

use support::{setup_db, tear_down};

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> i32 {
        self.called.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn state_changes_and_refund_post_processing() {
    let (db, partner) = setup_db(false).await;
    let state_changes = HookCalled::default();
    let post_processed = HookCalled::default();
    let mut hooks = EventHooks::default();
    let sc = state_changes.clone();
    hooks.on_state_changed(move |ev| {
        info!("🪝️ {} moved from {} to {}", ev.transaction.reference, ev.old_state, ev.new_state());
        sc.called();
        Box::pin(async {})
    });
    let pp = post_processed.clone();
    let hook_db = db.clone();
    hooks.on_post_processing(move |ev| {
        let pp = pp.clone();
        let api = TransactionFlowApi::new(hook_db.clone(), EventProducers::default());
        Box::pin(async move {
            let tx = api.post_process(&ev.transaction.reference).await.expect("Error post-processing");
            assert!(tx.is_post_processed);
            pp.called();
        })
    });
    let handlers = EventHandlers::new(16, hooks);
    let api = TransactionFlowApi::new(db.clone(), handlers.producers());

    api.create_transaction(NewTransaction::new("R001", 12.5, "USD").with_partner(partner).with_operation(Operation::Refund))
        .await
        .unwrap();
    api.create_transaction(NewTransaction::new("S001", 40.0, "USD").with_partner(partner)).await.unwrap();
    let tx = api.set_done("R001").await.unwrap();
    assert_eq!(tx.state, TransactionState::Done);
    let tx = api.set_canceled("S001").await.unwrap();
    assert_eq!(tx.state, TransactionState::Cancel);
    // cancel -> done is not allowed, so no event
    let tx = api.set_done("S001").await.unwrap();
    assert_eq!(tx.state, TransactionState::Cancel);
    drop(api);

    let EventHandlers { on_state_changed, on_post_processing } = handlers;
    let (on_state_changed, on_post_processing) = (on_state_changed.unwrap(), on_post_processing.unwrap());
    join(on_state_changed.start_handler(), on_post_processing.start_handler()).await;

    assert_eq!(state_changes.count(), 2);
    assert_eq!(post_processed.count(), 1);
    let tx = db_tx(&db, "R001").await;
    assert!(tx.is_post_processed);
    let tx = db_tx(&db, "S001").await;
    assert!(!tx.is_post_processed);
    tear_down(db).await;
}

async fn db_tx(
    db: &cybersource_payment_engine::SqliteDatabase,
    reference: &str,
) -> cybersource_payment_engine::db_types::PaymentTransaction {
    use cybersource_payment_engine::TransactionManagement;
    db.fetch_transaction(reference).await.unwrap().expect("Transaction not found")
}
