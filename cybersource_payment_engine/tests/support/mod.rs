use cpg_common::Secret;
use cybersource_payment_engine::{
    db_types::{NewPartner, NewTransaction, ProviderState, ProviderUpdate},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    CardPaymentApi,
    PartnerManagement,
    PaymentsDatabase,
    ProviderManagement,
    SqliteDatabase,
    TransactionManagement,
};
use cybersource_tools::{CreatePaymentRequest, CyberSourceApiError, CyberSourceConfig, GatewayResponse, PaymentsClient};
use log::*;
use mockall::mock;
use sqlx::{migrate::MigrateDatabase, Sqlite};

mock! {
    pub Gateway {}
    impl PaymentsClient for Gateway {
        async fn create_payment(
            &self,
            config: &CyberSourceConfig,
            request: &CreatePaymentRequest,
        ) -> Result<GatewayResponse, CyberSourceApiError>;
    }
}

/// A fresh database with a configured provider, one payer (id returned) and the USD currency (id 1).
pub async fn setup_db(capture_manually: bool) -> (SqliteDatabase, i64) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let update = ProviderUpdate::default()
        .with_credentials("test_merchant", "key-1234", Secret::new("c3VwZXItc2VjcmV0LWtleQ==".into()))
        .with_state(ProviderState::Test)
        .with_capture_manually(capture_manually);
    db.update_provider("cybersource", update).await.expect("Error configuring provider");
    let partner = NewPartner::new("Jane Doe")
        .with_address("1 Market St", "San Francisco", "CA", "94105", "US")
        .with_contact("jane@example.com", "4158880000");
    let partner = db.insert_partner(partner).await.expect("Error creating partner");
    (db, partner.id)
}

pub async fn new_transaction(db: &SqliteDatabase, tx: NewTransaction) {
    db.insert_transaction(tx).await.expect("Error creating transaction");
}

pub fn payment_api(db: SqliteDatabase, gateway: MockGateway) -> CardPaymentApi<SqliteDatabase, MockGateway> {
    CardPaymentApi::new(db, gateway, EventProducers::default())
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    let _ = Sqlite::drop_database(&url).await;
}
