use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use cpg_common::Secret;
use cybersource_payment_engine::{
    db_types::{NewPartner, ProviderState, ProviderUpdate},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    PartnerManagement,
    PaymentsDatabase,
    ProviderManagement,
    SqliteDatabase,
};
use log::*;

use crate::helpers::calculate_hmac;

pub const ADMIN_SECRET: &str = "admin-s3cr3t";

/// A fresh database with a configured provider in test mode and one payer, whose id is returned.
pub async fn setup_db() -> (SqliteDatabase, i64) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let update = ProviderUpdate::default()
        .with_credentials("test_merchant", "key-1234", Secret::new("c3VwZXItc2VjcmV0LWtleQ==".into()))
        .with_state(ProviderState::Test);
    db.update_provider("cybersource", update).await.expect("Error configuring provider");
    let partner = NewPartner::new("Jane Doe")
        .with_address("1 Market St", "San Francisco", "CA", "94105", "US")
        .with_contact("jane@example.com", "4158880000");
    let partner = db.insert_partner(partner).await.expect("Error creating partner");
    (db, partner.id)
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let path = db.url().trim_start_matches("sqlite://").to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    let _ = std::fs::remove_file(path);
}

/// Adds the admin signature for `body` to the request.
pub fn signed(req: TestRequest, body: &str) -> TestRequest {
    req.insert_header(("X-Cpg-Hmac-Sha256", calculate_hmac(ADMIN_SECRET, body.as_bytes())))
}

pub async fn send_request<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
