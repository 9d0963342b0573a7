//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate function. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database and gateway call is therefore expressed as a future,
//! and the gateway client enforces its own timeout.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use cybersource_payment_engine::{
    db_types::{NewTransaction, ProviderUpdate},
    payment_objects::{PaymentOutcome, PaymentRequest},
    CardPaymentApi,
    PaymentsDatabase,
    ProviderApi,
    TransactionFlowApi,
};
use cybersource_tools::PaymentsClient;
use log::*;

use crate::{
    config::ProxyOptions,
    data_objects::{ProviderSummary, TransactionAction},
    errors::ServerError,
    helpers::get_remote_ip,
};

pub const INVALID_PAYMENT_REQUEST: &str = "The payment request could not be read.";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(process_payment => Post "/process" impl PaymentsDatabase, PaymentsClient);
/// Route handler for card payments.
///
/// The checkout page posts the payment reference, the amount, currency and payer ids, and the card details. The
/// answer is always a `200 OK` with a JSON body of the form
/// `{"success": bool, "message": "...", "status": "...", "reason": "...", "data": {...}}`, where `status`, `reason`
/// and `data` are only present when CyberSource was contacted. Even a body that cannot be parsed gets this treatment.
pub async fn process_payment<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<CardPaymentApi<B, G>>,
) -> HttpResponse
where
    B: PaymentsDatabase,
    G: PaymentsClient,
{
    handle_payment_request(&req, body, api.as_ref()).await
}

route!(simulate_payment => Post "/simulate_payment" impl PaymentsDatabase, PaymentsClient);
/// Legacy name for [`process_payment`]. Both routes behave identically.
pub async fn simulate_payment<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<CardPaymentApi<B, G>>,
) -> HttpResponse
where
    B: PaymentsDatabase,
    G: PaymentsClient,
{
    handle_payment_request(&req, body, api.as_ref()).await
}

async fn handle_payment_request<B, G>(req: &HttpRequest, body: web::Bytes, api: &CardPaymentApi<B, G>) -> HttpResponse
where
    B: PaymentsDatabase,
    G: PaymentsClient,
{
    let options = req.app_data::<web::Data<ProxyOptions>>().map(|o| *o.get_ref()).unwrap_or_default();
    let remote = get_remote_ip(req, options).map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string());
    let outcome = match serde_json::from_slice::<PaymentRequest>(body.as_ref()) {
        Ok(request) => {
            let reference = request.reference().unwrap_or_default();
            debug!("💻️ Payment request for [{reference}] from {remote}");
            api.process_payment(request).await
        },
        Err(e) => {
            // The parser message can quote the offending value, so only the position is logged
            warn!(
                "💻️ Unreadable payment request from {remote}: {:?} error at line {}, column {}",
                e.classify(),
                e.line(),
                e.column()
            );
            PaymentOutcome::rejected(INVALID_PAYMENT_REQUEST)
        },
    };
    HttpResponse::Ok().json(outcome)
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(create_transaction => Post "/transactions" impl PaymentsDatabase);
/// Route handler for registering a new `draft` transaction.
///
/// Admin only. Returns `409 Conflict` if the reference is already in use.
pub async fn create_transaction<B: PaymentsDatabase>(
    body: web::Json<NewTransaction>,
    api: web::Data<TransactionFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let mut tx = body.into_inner();
    tx.reference = tx.reference.trim().to_string();
    if tx.reference.is_empty() {
        return Err(ServerError::InvalidRequestBody("The transaction reference is missing.".into()));
    }
    if !tx.amount.is_finite() || tx.amount <= 0.0 {
        return Err(ServerError::InvalidRequestBody("The transaction amount must be positive.".into()));
    }
    debug!("💻️ POST new transaction [{}]", tx.reference);
    let tx = api.create_transaction(tx).await?;
    Ok(HttpResponse::Ok().json(tx))
}

route!(transaction_details => Get "/transactions/{reference}" impl PaymentsDatabase);
/// Route handler for fetching a transaction, along with the history of its state changes.
pub async fn transaction_details<B: PaymentsDatabase>(
    path: web::Path<String>,
    api: web::Data<TransactionFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let reference = path.into_inner();
    debug!("💻️ GET transaction [{reference}]");
    let details = api.transaction_details(&reference).await?;
    Ok(HttpResponse::Ok().json(details))
}

route!(transaction_action => Post "/transactions/{reference}/{action}" impl PaymentsDatabase);
/// Route handler for the manual transaction transitions.
///
/// `action` is one of
/// * `done` - mark the transaction as paid,
/// * `cancel` - cancel it, as if the payment was declined,
/// * `error` - put it in the error state,
/// * `capture` - confirm the capture of an authorized (manual capture) payment.
///
/// Transitions that the state machine does not allow are ignored, and the unchanged transaction is returned.
pub async fn transaction_action<B: PaymentsDatabase>(
    path: web::Path<(String, String)>,
    api: web::Data<TransactionFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (reference, action) = path.into_inner();
    let action = action.parse::<TransactionAction>().map_err(ServerError::InvalidRequestPath)?;
    info!("💻️ Admin action {action:?} on transaction [{reference}]");
    let tx = match action {
        TransactionAction::Done => api.set_done(&reference).await,
        TransactionAction::Cancel => api.set_canceled(&reference).await,
        TransactionAction::Error => api.set_error(&reference).await,
        TransactionAction::Capture => api.capture(&reference).await,
    }?;
    Ok(HttpResponse::Ok().json(tx))
}

//----------------------------------------------   Providers  ----------------------------------------------------
route!(provider => Get "/providers/{code}" impl PaymentsDatabase);
/// Route handler for fetching a provider record. The secret key is never returned.
pub async fn provider<B: PaymentsDatabase>(
    path: web::Path<String>,
    api: web::Data<ProviderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = path.into_inner();
    debug!("💻️ GET provider {code}");
    let provider = api
        .fetch_provider(&code)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Provider {code} does not exist.")))?;
    Ok(HttpResponse::Ok().json(ProviderSummary::from(provider)))
}

route!(update_provider => Put "/providers/{code}" impl PaymentsDatabase);
/// Route handler for updating the provider credentials and options. Fields that are omitted are left unchanged.
pub async fn update_provider<B: PaymentsDatabase>(
    path: web::Path<String>,
    body: web::Json<ProviderUpdate>,
    api: web::Data<ProviderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = path.into_inner();
    let update = body.into_inner();
    if update.is_empty() {
        return Err(ServerError::InvalidRequestBody("The provider update contains no changes.".into()));
    }
    info!("💻️ PUT provider {code}");
    let provider = api.update_credentials(&code, update).await?;
    Ok(HttpResponse::Ok().json(ProviderSummary::from(provider)))
}
