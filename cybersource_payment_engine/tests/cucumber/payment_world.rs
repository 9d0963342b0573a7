use cucumber::World;
use cybersource_payment_engine::{
    events::EventProducers,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    SqliteDatabase,
    TransactionFlowApi,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct PaymentWorld {
    pub system: Option<PaymentSystem>,
}

#[derive(Debug)]
pub struct PaymentSystem {
    pub db_path: String,
    pub api: TransactionFlowApi<SqliteDatabase>,
}

impl PaymentWorld {
    pub fn api(&self) -> &TransactionFlowApi<SqliteDatabase> {
        &self.system.as_ref().expect("TransactionFlowApi not initialised").api
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.api().db()
    }
}

impl PaymentSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let api = TransactionFlowApi::new(db, EventProducers::default());
        Self { db_path: url, api }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
