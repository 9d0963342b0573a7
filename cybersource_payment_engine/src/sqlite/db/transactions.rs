use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, PaymentTransaction, StateChange},
    traits::{DatabaseError, StateUpdate},
};

const SELECT_TRANSACTION: &str = r#"
    SELECT
        t.*,
        COALESCE(p.capture_manually, 0) AS capture_manually
    FROM payment_transactions t
    LEFT JOIN payment_providers p ON p.code = t.provider_code
"#;

pub async fn insert_transaction(
    tx: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<PaymentTransaction, DatabaseError> {
    if fetch_transaction(&tx.reference, conn).await?.is_some() {
        return Err(DatabaseError::TransactionAlreadyExists(tx.reference));
    }
    let result = sqlx::query(
        r#"
            INSERT INTO payment_transactions (reference, provider_code, partner_id, amount, currency, operation)
            VALUES ($1, $2, $3, $4, $5, $6);
        "#,
    )
    .bind(&tx.reference)
    .bind(&tx.provider_code)
    .bind(tx.partner_id)
    .bind(tx.amount)
    .bind(&tx.currency)
    .bind(tx.operation)
    .execute(&mut *conn)
    .await?;
    let id = result.last_insert_rowid();
    debug!("🗃️ Transaction [{}] inserted with id {id}", tx.reference);
    fetch_transaction_by_id(id, conn).await?.ok_or_else(|| DatabaseError::TransactionNotFound(tx.reference))
}

pub async fn fetch_transaction_by_id(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentTransaction>, sqlx::Error> {
    let q = format!("{SELECT_TRANSACTION} WHERE t.id = $1");
    sqlx::query_as(&q).bind(id).fetch_optional(conn).await
}

pub async fn fetch_transaction(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentTransaction>, sqlx::Error> {
    let q = format!("{SELECT_TRANSACTION} WHERE t.reference = $1");
    sqlx::query_as(&q).bind(reference).fetch_optional(conn).await
}

pub async fn fetch_transaction_for_provider(
    provider_code: &str,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentTransaction>, sqlx::Error> {
    let q = format!("{SELECT_TRANSACTION} WHERE t.reference = $1 AND t.provider_code = $2");
    sqlx::query_as(&q).bind(reference).bind(provider_code).fetch_optional(conn).await
}

pub async fn set_provider_reference(
    id: i64,
    provider_reference: &str,
    conn: &mut SqliteConnection,
) -> Result<PaymentTransaction, DatabaseError> {
    let result = sqlx::query(
        "UPDATE payment_transactions SET provider_reference = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(provider_reference)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::TransactionNotFound(format!("id {id}")));
    }
    fetch_transaction_by_id(id, conn).await?.ok_or_else(|| DatabaseError::TransactionNotFound(format!("id {id}")))
}

/// Changes the transaction state if, and only if, it is still in `update.old_state`. Returns the number of rows
/// changed (0 or 1).
///
/// This is not atomic with the audit log entry. Embed this call in a transaction along with [`insert_state_change`].
pub async fn update_state(id: i64, update: &StateUpdate, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE payment_transactions
            SET state = $1, state_message = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND state = $4
        "#,
    )
    .bind(update.new_state)
    .bind(update.message.as_deref())
    .bind(id)
    .bind(update.old_state)
    .execute(conn)
    .await?;
    trace!("🗃️ State update {} -> {} for tx #{id}: {} rows", update.old_state, update.new_state, result.rows_affected());
    Ok(result.rows_affected())
}

pub async fn insert_state_change(
    id: i64,
    update: &StateUpdate,
    conn: &mut SqliteConnection,
) -> Result<StateChange, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO transaction_state_changes (transaction_id, old_state, new_state, message)
            VALUES ($1, $2, $3, $4);
        "#,
    )
    .bind(id)
    .bind(update.old_state)
    .bind(update.new_state)
    .bind(update.message.as_deref())
    .execute(&mut *conn)
    .await?;
    sqlx::query_as("SELECT * FROM transaction_state_changes WHERE id = $1")
        .bind(result.last_insert_rowid())
        .fetch_one(conn)
        .await
}

pub async fn mark_post_processed(id: i64, conn: &mut SqliteConnection) -> Result<PaymentTransaction, DatabaseError> {
    let result = sqlx::query(
        "UPDATE payment_transactions SET is_post_processed = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::TransactionNotFound(format!("id {id}")));
    }
    fetch_transaction_by_id(id, conn).await?.ok_or_else(|| DatabaseError::TransactionNotFound(format!("id {id}")))
}

pub async fn fetch_state_history(id: i64, conn: &mut SqliteConnection) -> Result<Vec<StateChange>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM transaction_state_changes WHERE transaction_id = $1 ORDER BY id ASC")
        .bind(id)
        .fetch_all(conn)
        .await
}
