use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use cpg_common::Secret;
use cybersource_payment_engine::{
    db_types::{NewTransaction, PaymentTransaction, ProviderState, TransactionState},
    events::EventProducers,
    payment_objects::TransactionDetails,
    ProviderApi,
    SqliteDatabase,
    TransactionFlowApi,
    TransactionManagement,
};
use serde_json::{json, Value};

use super::helpers::{send_request, setup_db, signed, tear_down, ADMIN_SECRET};
use crate::{
    data_objects::ProviderSummary,
    middleware::{HmacMiddlewareFactory, ADMIN_HMAC_HEADER},
    routes::{
        CreateTransactionRoute,
        ProviderRoute,
        TransactionActionRoute,
        TransactionDetailsRoute,
        UpdateProviderRoute,
    },
};

fn configure(db: SqliteDatabase, secret: &str, checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    let secret = Secret::new(secret.to_string());
    move |cfg: &mut ServiceConfig| {
        let flow_api = TransactionFlowApi::new(db.clone(), EventProducers::default());
        let provider_api = ProviderApi::new(db);
        cfg.service(
            web::scope("/admin")
                .wrap(HmacMiddlewareFactory::new(ADMIN_HMAC_HEADER, secret, checks))
                .service(CreateTransactionRoute::<SqliteDatabase>::new())
                .service(TransactionDetailsRoute::<SqliteDatabase>::new())
                .service(TransactionActionRoute::<SqliteDatabase>::new())
                .service(ProviderRoute::<SqliteDatabase>::new())
                .service(UpdateProviderRoute::<SqliteDatabase>::new()),
        )
        .app_data(web::Data::new(flow_api))
        .app_data(web::Data::new(provider_api));
    }
}

async fn admin_request(req: TestRequest, body: &str, db: &SqliteDatabase) -> Result<(StatusCode, String), String> {
    let req = signed(req, body).insert_header(("Content-Type", "application/json")).set_payload(body.to_string());
    send_request(req, configure(db.clone(), ADMIN_SECRET, true)).await
}

#[actix_web::test]
async fn unsigned_requests_are_refused() {
    let (db, _) = setup_db().await;
    let req = TestRequest::get().uri("/admin/transactions/S1");
    let err = send_request(req, configure(db.clone(), ADMIN_SECRET, true)).await.expect_err("Expected error");
    assert_eq!(err, "No HMAC signature found.");

    let req = TestRequest::get().uri("/admin/transactions/S1").insert_header((ADMIN_HMAC_HEADER, "bm9wZQ=="));
    let err = send_request(req, configure(db.clone(), ADMIN_SECRET, true)).await.expect_err("Expected error");
    assert_eq!(err, "Invalid HMAC signature.");

    // A signature over a different body does not match
    let req = signed(TestRequest::post().uri("/admin/transactions"), "{}").set_payload(r#"{"reference":"S1"}"#);
    let err = send_request(req, configure(db.clone(), ADMIN_SECRET, true)).await.expect_err("Expected error");
    assert_eq!(err, "Invalid HMAC signature.");
    tear_down(db).await;
}

#[actix_web::test]
async fn admin_is_closed_without_a_secret() {
    let (db, _) = setup_db().await;
    let req = signed(TestRequest::get().uri("/admin/transactions/S1"), "");
    let err = send_request(req, configure(db.clone(), "", true)).await.expect_err("Expected error");
    assert_eq!(err, "Admin access has not been configured.");
    tear_down(db).await;
}

#[actix_web::test]
async fn checks_can_be_disabled() {
    let (db, _) = setup_db().await;
    db.insert_transaction(NewTransaction::new("S00200", 10.0, "USD")).await.unwrap();
    let req = TestRequest::get().uri("/admin/transactions/S00200");
    let (status, body) = send_request(req, configure(db.clone(), "", false)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let details: TransactionDetails = serde_json::from_str(&body).unwrap();
    assert_eq!(details.transaction.reference, "S00200");
    assert!(details.history.is_empty());
    tear_down(db).await;
}

#[actix_web::test]
async fn create_and_fetch_transactions() {
    let (db, partner) = setup_db().await;
    let body = json!({"reference": " S00201 ", "partner_id": partner, "amount": 25.5, "currency": "USD"}).to_string();
    let (status, res) =
        admin_request(TestRequest::post().uri("/admin/transactions"), &body, &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let tx: PaymentTransaction = serde_json::from_str(&res).unwrap();
    assert_eq!(tx.reference, "S00201");
    assert_eq!(tx.state, TransactionState::Draft);
    assert_eq!(tx.provider_code, "cybersource");
    assert_eq!(tx.partner_id, Some(partner));

    let (status, res) =
        admin_request(TestRequest::post().uri("/admin/transactions"), &body, &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    let err: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(
        err["error"],
        "The request conflicts with existing data. A transaction with reference S00201 already exists."
    );

    let body = json!({"reference": "S00202", "amount": 0, "currency": "USD"}).to_string();
    let (status, _) =
        admin_request(TestRequest::post().uri("/admin/transactions"), &body, &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        admin_request(TestRequest::get().uri("/admin/transactions/S99999"), "", &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn transaction_actions() {
    let (db, _) = setup_db().await;
    db.insert_transaction(NewTransaction::new("S00203", 10.0, "USD")).await.unwrap();
    db.insert_transaction(NewTransaction::new("S00204", 10.0, "USD")).await.unwrap();

    let (status, res) = admin_request(TestRequest::post().uri("/admin/transactions/S00203/done"), "", &db)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let tx: PaymentTransaction = serde_json::from_str(&res).unwrap();
    assert_eq!(tx.state, TransactionState::Done);

    // done is final, so a cancel is ignored
    let (status, res) = admin_request(TestRequest::post().uri("/admin/transactions/S00203/cancel"), "", &db)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let tx: PaymentTransaction = serde_json::from_str(&res).unwrap();
    assert_eq!(tx.state, TransactionState::Done);

    let (_, res) = admin_request(TestRequest::post().uri("/admin/transactions/S00204/error"), "", &db)
        .await
        .expect("Request failed");
    let tx: PaymentTransaction = serde_json::from_str(&res).unwrap();
    assert_eq!(tx.state, TransactionState::Error);

    let (status, _) = admin_request(TestRequest::post().uri("/admin/transactions/S00204/refund"), "", &db)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, res) =
        admin_request(TestRequest::get().uri("/admin/transactions/S00203"), "", &db).await.expect("Request failed");
    let details: TransactionDetails = serde_json::from_str(&res).unwrap();
    assert_eq!(details.history.len(), 1);
    assert_eq!(details.history[0].old_state, TransactionState::Draft);
    assert_eq!(details.history[0].new_state, TransactionState::Done);
    tear_down(db).await;
}

#[actix_web::test]
async fn provider_updates_never_return_secrets() {
    let (db, _) = setup_db().await;
    let body = json!({
        "merchant_id": "live_merchant",
        "secret_key": "bmV3LXNlY3JldA==",
        "state": "enabled",
        "capture_manually": true
    })
    .to_string();
    let (status, res) =
        admin_request(TestRequest::put().uri("/admin/providers/cybersource"), &body, &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(!res.contains("bmV3LXNlY3JldA=="));
    let summary: ProviderSummary = serde_json::from_str(&res).unwrap();
    assert_eq!(summary.merchant_id, "live_merchant");
    assert_eq!(summary.key_id, "key-1234");
    assert_eq!(summary.state, ProviderState::Enabled);
    assert!(summary.capture_manually);
    assert!(summary.has_secret_key);
    assert!(summary.missing_credentials.is_empty());

    let (status, res) =
        admin_request(TestRequest::get().uri("/admin/providers/cybersource"), "", &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let summary: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(summary["merchant_id"], "live_merchant");
    assert!(summary.get("secret_key").is_none());

    let (status, _) =
        admin_request(TestRequest::put().uri("/admin/providers/cybersource"), "{}", &db).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = admin_request(TestRequest::put().uri("/admin/providers/paypal"), r#"{"key_id":"k"}"#, &db)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}
