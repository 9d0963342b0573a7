//! `SqliteDatabase` is a concrete implementation of a CyberSource payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{db_url, new_pool, partners, providers, transactions};
use crate::{
    db_types::{
        Currency,
        NewPartner,
        NewTransaction,
        Partner,
        PaymentProvider,
        PaymentTransaction,
        ProviderUpdate,
        StateChange,
    },
    traits::{
        DatabaseError,
        PartnerManagement,
        PaymentsDatabase,
        ProviderManagement,
        StateUpdate,
        TransactionManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `CPG_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Connected to SQLite database at {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database file at `url`, and its parent directory, if they do not exist yet.
    pub async fn create_if_missing(url: &str) -> Result<(), DatabaseError> {
        let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
        let path = path.split('?').next().unwrap_or_default();
        if path.is_empty() || path.starts_with(":memory:") {
            return Ok(());
        }
        if let Some(dir) = std::path::Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                DatabaseError::DatabaseError(format!("Could not create database directory {}: {e}", dir.display()))
            })?;
        }
        if !Sqlite::database_exists(url).await? {
            Sqlite::create_database(url).await?;
            info!("🗃️ Created new database at {url}");
        }
        Ok(())
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl PaymentsDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), DatabaseError> {
        self.pool.close().await;
        Ok(())
    }
}

impl PartnerManagement for SqliteDatabase {
    async fn fetch_partner(&self, id: i64) -> Result<Option<Partner>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let partner = partners::fetch_partner(id, &mut conn).await?;
        Ok(partner)
    }

    async fn insert_partner(&self, partner: NewPartner) -> Result<Partner, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let partner = partners::insert_partner(partner, &mut tx).await?;
        tx.commit().await?;
        Ok(partner)
    }

    async fn fetch_currency(&self, id: i64) -> Result<Option<Currency>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let currency = partners::fetch_currency(id, &mut conn).await?;
        Ok(currency)
    }
}

impl ProviderManagement for SqliteDatabase {
    async fn fetch_provider(&self, code: &str) -> Result<Option<PaymentProvider>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let provider = providers::fetch_provider(code, &mut conn).await?;
        Ok(provider)
    }

    async fn update_provider(&self, code: &str, update: ProviderUpdate) -> Result<PaymentProvider, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let provider = providers::update_provider(code, update, &mut tx).await?;
        tx.commit().await?;
        Ok(provider)
    }
}

impl TransactionManagement for SqliteDatabase {
    async fn insert_transaction(&self, new_tx: NewTransaction) -> Result<PaymentTransaction, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = transactions::insert_transaction(new_tx, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_transaction(&self, reference: &str) -> Result<Option<PaymentTransaction>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_transaction(reference, &mut conn).await?;
        Ok(tx)
    }

    async fn fetch_transaction_for_provider(
        &self,
        provider_code: &str,
        reference: &str,
    ) -> Result<Option<PaymentTransaction>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_transaction_for_provider(provider_code, reference, &mut conn).await?;
        Ok(tx)
    }

    async fn set_provider_reference(
        &self,
        transaction_id: i64,
        provider_reference: &str,
    ) -> Result<PaymentTransaction, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = transactions::set_provider_reference(transaction_id, provider_reference, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn update_transaction_state(
        &self,
        transaction_id: i64,
        update: StateUpdate,
    ) -> Result<Option<PaymentTransaction>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let changed = transactions::update_state(transaction_id, &update, &mut tx).await?;
        if changed == 0 {
            debug!(
                "🗃️ Transaction #{transaction_id} is no longer in state {}. State change discarded.",
                update.old_state
            );
            tx.rollback().await?;
            return Ok(None);
        }
        let entry = transactions::insert_state_change(transaction_id, &update, &mut tx).await?;
        let result = transactions::fetch_transaction_by_id(transaction_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Transaction #{transaction_id} moved {} -> {} (log #{})", entry.old_state, entry.new_state, entry.id);
        Ok(result)
    }

    async fn mark_post_processed(&self, transaction_id: i64) -> Result<PaymentTransaction, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = transactions::mark_post_processed(transaction_id, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_state_history(&self, transaction_id: i64) -> Result<Vec<StateChange>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let history = transactions::fetch_state_history(transaction_id, &mut conn).await?;
        Ok(history)
    }
}
