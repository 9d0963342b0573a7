use cpg_common::Secret;
use log::debug;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::{
    db_types::{PaymentProvider, ProviderUpdate},
    traits::DatabaseError,
};

// Decoded by hand so that the shared secret goes straight into a `Secret`.
impl<'r> FromRow<'r, SqliteRow> for PaymentProvider {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            state: row.try_get("state")?,
            merchant_id: row.try_get("merchant_id")?,
            key_id: row.try_get("key_id")?,
            secret_key: Secret::new(row.try_get("secret_key")?),
            capture_manually: row.try_get("capture_manually")?,
            timeout_secs: row.try_get("timeout_secs")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

pub async fn fetch_provider(code: &str, conn: &mut SqliteConnection) -> Result<Option<PaymentProvider>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payment_providers WHERE code = $1").bind(code).fetch_optional(conn).await
}

pub async fn update_provider(
    code: &str,
    update: ProviderUpdate,
    conn: &mut SqliteConnection,
) -> Result<PaymentProvider, DatabaseError> {
    if update.is_empty() {
        debug!("🗃️ Empty provider update for {code}. Nothing to do.");
        return fetch_provider(code, conn).await?.ok_or_else(|| DatabaseError::ProviderNotFound(code.to_string()));
    }
    if matches!(update.timeout_secs, Some(t) if t <= 0) {
        return Err(DatabaseError::InvalidData("The gateway timeout must be a positive number of seconds".into()));
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE payment_providers SET updated_at = CURRENT_TIMESTAMP");
    if let Some(merchant_id) = update.merchant_id {
        builder.push(", merchant_id = ").push_bind(merchant_id.trim().to_string());
    }
    if let Some(key_id) = update.key_id {
        builder.push(", key_id = ").push_bind(key_id.trim().to_string());
    }
    if let Some(secret) = update.secret_key {
        builder.push(", secret_key = ").push_bind(secret.reveal().trim().to_string());
    }
    if let Some(state) = update.state {
        builder.push(", state = ").push_bind(state);
    }
    if let Some(capture_manually) = update.capture_manually {
        builder.push(", capture_manually = ").push_bind(capture_manually);
    }
    if let Some(timeout) = update.timeout_secs {
        builder.push(", timeout_secs = ").push_bind(timeout);
    }
    builder.push(" WHERE code = ").push_bind(code);
    let result = builder.build().execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::ProviderNotFound(code.to_string()));
    }
    let provider =
        fetch_provider(code, conn).await?.ok_or_else(|| DatabaseError::ProviderNotFound(code.to_string()))?;
    debug!("🗃️ Provider {code} updated. State: {}", provider.state);
    Ok(provider)
}
