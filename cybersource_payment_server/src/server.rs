use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use cpg_common::CYBERSOURCE_PROVIDER_CODE;
use cybersource_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CardPaymentApi,
    ProviderApi,
    SqliteDatabase,
    TransactionFlowApi,
};
use cybersource_tools::CyberSourceApi;
use log::*;

use crate::{
    config::{ProxyOptions, ServerConfig},
    errors::ServerError,
    middleware::{HmacMiddlewareFactory, ADMIN_HMAC_HEADER},
    routes::{
        health,
        CreateTransactionRoute,
        ProcessPaymentRoute,
        ProviderRoute,
        SimulatePaymentRoute,
        TransactionActionRoute,
        TransactionDetailsRoute,
        UpdateProviderRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    SqliteDatabase::create_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    seed_provider(&config, &db).await?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, create_event_hooks(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let gateway = CyberSourceApi::new().map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Writes the CyberSource credentials from the environment, if any, to the provider record.
async fn seed_provider(config: &ServerConfig, db: &SqliteDatabase) -> Result<(), ServerError> {
    let Some(seed) = &config.cybersource else {
        return Ok(());
    };
    let api = ProviderApi::new(db.clone());
    let provider = api.update_credentials(CYBERSOURCE_PROVIDER_CODE, seed.provider_update()).await.map_err(|e| {
        ServerError::InitializeError(format!("Could not store the CyberSource credentials from the environment. {e}"))
    })?;
    info!("🪛️ CyberSource provider configured from the environment for merchant {}", provider.merchant_id);
    Ok(())
}

/// Refunds that reach `done` are post-processed in the background.
fn create_event_hooks(db: SqliteDatabase) -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_state_changed(|ev| {
        Box::pin(async move {
            info!("📬️ Transaction [{}] moved from {} to {}", ev.transaction.reference, ev.old_state, ev.new_state());
        })
    });
    hooks.on_post_processing(move |ev| {
        let api = TransactionFlowApi::new(db.clone(), EventProducers::default());
        Box::pin(async move {
            let reference = ev.transaction.reference;
            match api.post_process(&reference).await {
                Ok(_) => debug!("📬️ Post-processing of [{reference}] complete"),
                Err(e) => error!("📬️ Post-processing of [{reference}] failed. {e}"),
            }
        })
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: CyberSourceApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let proxy_options = ProxyOptions::from_config(&config);
    let adapter_options = config.adapter_options();
    let admin = config.admin.clone();
    let srv = HttpServer::new(move || {
        let payments_api = CardPaymentApi::new(db.clone(), gateway.clone(), producers.clone())
            .with_options(adapter_options.clone());
        let flow_api = TransactionFlowApi::new(db.clone(), producers.clone());
        let provider_api = ProviderApi::new(db.clone());
        let payment_scope = web::scope("/payment/cybersource")
            .service(ProcessPaymentRoute::<SqliteDatabase, CyberSourceApi>::new())
            .service(SimulatePaymentRoute::<SqliteDatabase, CyberSourceApi>::new());
        let admin_scope = web::scope("/admin")
            .wrap(HmacMiddlewareFactory::new(ADMIN_HMAC_HEADER, admin.hmac_secret.clone(), admin.hmac_checks))
            .service(CreateTransactionRoute::<SqliteDatabase>::new())
            .service(TransactionDetailsRoute::<SqliteDatabase>::new())
            .service(TransactionActionRoute::<SqliteDatabase>::new())
            .service(ProviderRoute::<SqliteDatabase>::new())
            .service(UpdateProviderRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cpg::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(provider_api))
            .app_data(web::Data::new(proxy_options))
            .service(health)
            .service(payment_scope)
            .service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
