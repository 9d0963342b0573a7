use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Currency, NewPartner, Partner};

/// Inserts a new partner and reads it back on the same connection.
pub async fn insert_partner(partner: NewPartner, conn: &mut SqliteConnection) -> Result<Partner, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO partners (name, street, city, state_code, zip, country_code, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
        "#,
    )
    .bind(partner.name)
    .bind(partner.street)
    .bind(partner.city)
    .bind(partner.state_code)
    .bind(partner.zip)
    .bind(partner.country_code)
    .bind(partner.email)
    .bind(partner.phone)
    .execute(&mut *conn)
    .await?;
    let id = result.last_insert_rowid();
    debug!("🗃️ Partner #{id} created");
    fetch_partner(id, conn).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn fetch_partner(id: i64, conn: &mut SqliteConnection) -> Result<Option<Partner>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM partners WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_currency(id: i64, conn: &mut SqliteConnection) -> Result<Option<Currency>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM currencies WHERE id = $1").bind(id).fetch_optional(conn).await
}
