use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use cybersource_payment_engine::{
    db_types::{NewTransaction, TransactionState},
    events::EventProducers,
    payment_objects::PaymentOutcome,
    CardPaymentApi,
    SqliteDatabase,
    TransactionManagement,
};
use cybersource_tools::{CyberSourceApiError, GatewayResponse};
use serde_json::{json, Value};

use super::{
    helpers::{send_request, setup_db, tear_down},
    mocks::MockGateway,
};
use crate::routes::{ProcessPaymentRoute, SimulatePaymentRoute, INVALID_PAYMENT_REQUEST};

fn payment_body(reference: &str, partner: i64, card: &str) -> String {
    json!({
        "reference": reference,
        "values": {"partner": partner, "currency": 1, "amount": "49.90"},
        "customer_input": {"card_num": card, "exp_month": "7", "exp_year": "2030", "cvv": "321"}
    })
    .to_string()
}

fn configure(db: SqliteDatabase, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = CardPaymentApi::new(db, gateway, EventProducers::default());
        cfg.service(
            web::scope("/payment/cybersource")
                .service(ProcessPaymentRoute::<SqliteDatabase, MockGateway>::new())
                .service(SimulatePaymentRoute::<SqliteDatabase, MockGateway>::new()),
        )
        .app_data(web::Data::new(api));
    }
}

async fn post_payment(path: &str, body: String, db: SqliteDatabase, gateway: MockGateway) -> PaymentOutcome {
    let req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body);
    let (status, body) = send_request(req, configure(db, gateway)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    serde_json::from_str(&body).expect("Response is not a payment outcome")
}

#[actix_web::test]
async fn authorized_payment() {
    let (db, partner) = setup_db().await;
    db.insert_transaction(NewTransaction::new("S00100", 49.90, "USD").with_partner(partner)).await.unwrap();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment()
        .withf(|_, req| {
            req.client_reference_information.code == "S00100" && req.payment_information.card.card_type == "002"
        })
        .times(1)
        .returning(|_, _| Ok(GatewayResponse::new(201, json!({"id": "7103918257", "status": "AUTHORIZED"}))));
    let body = payment_body("S00100", partner, "5105105105105100");
    let outcome = post_payment("/payment/cybersource/process", body, db.clone(), gateway).await;
    assert!(outcome.success);
    assert_eq!(outcome.message, PaymentOutcome::APPROVED_MESSAGE);
    assert_eq!(outcome.status.as_deref(), Some("AUTHORIZED"));
    assert_eq!(outcome.data.as_ref().and_then(|d| d.get("id")).and_then(Value::as_str), Some("7103918257"));
    let tx = db.fetch_transaction("S00100").await.unwrap().unwrap();
    assert_eq!(tx.state, TransactionState::Done);
    assert_eq!(tx.provider_reference.as_deref(), Some("cybersource-S00100"));
    tear_down(db).await;
}

#[actix_web::test]
async fn declined_payment_on_legacy_route() {
    let (db, partner) = setup_db().await;
    db.insert_transaction(NewTransaction::new("S00101", 49.90, "USD").with_partner(partner)).await.unwrap();
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment().times(1).returning(|_, _| {
        Ok(GatewayResponse::new(
            400,
            json!({
                "status": "INVALID_REQUEST",
                "errorInformation": {"reason": "INVALID_ACCOUNT", "message": "Invalid account number"}
            }),
        ))
    });
    let body = payment_body("S00101", partner, "4242424242424242");
    let outcome = post_payment("/payment/cybersource/simulate_payment", body, db.clone(), gateway).await;
    assert!(!outcome.success);
    assert_eq!(outcome.reason.as_deref(), Some("INVALID_ACCOUNT"));
    assert_eq!(outcome.message, "Invalid account number");
    let tx = db.fetch_transaction("S00101").await.unwrap().unwrap();
    assert_eq!(tx.state, TransactionState::Cancel);
    tear_down(db).await;
}

#[actix_web::test]
async fn transport_errors_are_not_leaked() {
    let (db, partner) = setup_db().await;
    db.insert_transaction(NewTransaction::new("S00102", 49.90, "USD").with_partner(partner)).await.unwrap();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment()
        .times(1)
        .returning(|_, _| Err(CyberSourceApiError::RestRequestError("connection refused (10.0.0.3:443)".into())));
    let body = payment_body("S00102", partner, "4242424242424242");
    let outcome = post_payment("/payment/cybersource/process", body, db.clone(), gateway).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "An unexpected error occurred while contacting CyberSource.");
    assert!(outcome.status.is_none());
    let tx = db.fetch_transaction("S00102").await.unwrap().unwrap();
    assert_eq!(tx.state, TransactionState::Draft);
    tear_down(db).await;
}

#[actix_web::test]
async fn malformed_requests_get_a_200() {
    let (db, _) = setup_db().await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment().never();
    let outcome =
        post_payment("/payment/cybersource/process", "{\"reference\": \"S1\", ".into(), db.clone(), gateway).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, INVALID_PAYMENT_REQUEST);
    tear_down(db).await;
}

#[actix_web::test]
async fn validation_errors_are_reported() {
    let (db, partner) = setup_db().await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment().never();
    let body = payment_body("", partner, "4242424242424242");
    let outcome = post_payment("/payment/cybersource/process", body, db.clone(), gateway).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "The payment reference is missing.");
    let raw = serde_json::to_value(&outcome).unwrap();
    assert!(raw.get("status").is_none());
    assert!(raw.get("data").is_none());
    tear_down(db).await;
}

#[actix_web::test]
async fn null_sections_are_validated() {
    let (db, _) = setup_db().await;
    let mut gateway = MockGateway::new();
    gateway.expect_create_payment().never();
    let body = json!({"reference": "S00103", "values": null, "customer_input": null}).to_string();
    let outcome = post_payment("/payment/cybersource/process", body, db.clone(), gateway).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "The customer related to this payment could not be found.");
    tear_down(db).await;
}
