//! # CyberSource payment engine public API
//!
//! The `cpe_api` module exposes the programmatic API of the payment engine. The API is modular, so that clients can
//! pick the functionality they need.
//!
//! * [`card_payment_api`] takes a card payment request from a checkout page, sends it to CyberSource and reports the
//!   outcome to the transaction flow.
//! * [`transaction_flow_api`] applies gateway notifications (and the equivalent admin actions) to payment transactions.
//! * [`provider_api`] reads and updates the merchant credentials used to sign gateway requests.
//!
//! The other submodules are support types and functions.
//!
//! # API usage
//!
//! Every API is created by supplying a database backend that implements the backend traits it needs:
//!
//! ```rust,ignore
//! use cybersource_payment_engine::{ProviderApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/cpg_store.db", 5).await?;
//! let api = ProviderApi::new(db);
//! let config = api.gateway_config("cybersource").await?;
//! ```
pub mod card;
pub mod card_payment_api;
pub mod errors;
pub mod payload;
pub mod payment_objects;
pub mod provider_api;
pub mod transaction_flow_api;
