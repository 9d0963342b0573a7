//! CyberSource Payment Engine
//!
//! The payment engine accepts card payments on behalf of an order-management platform and settles them through the
//! CyberSource REST gateway. This library contains the core logic:
//!
//! 1. The order-system backend ([`mod@sqlite`] and the contracts in [`traits`]). It stores payers, currencies, the
//!    provider (merchant credential) record and payment transactions, along with an audit log of every transaction
//!    state change. The data types are defined in [`db_types`].
//! 2. The public API ([`mod@cpe_api`]). [`CardPaymentApi`] validates checkout requests and talks to the gateway,
//!    [`TransactionFlowApi`] turns gateway verdicts into transaction state changes, and [`ProviderApi`] manages the
//!    merchant credentials.
//!
//! The engine also emits events that can be subscribed to, e.g. whenever a transaction changes state. A simple actor
//! framework ([`events`]) lets you hook into these events and perform custom actions.
pub mod db_types;
pub mod events;
pub mod traits;

mod cpe_api;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use cpe_api::{
    card::{CardDetails, CardNetwork},
    card_payment_api::{parse_amount, CardPaymentApi, DEFAULT_DECLINE_MESSAGE, DEFAULT_DECLINE_REASON, SUCCESS_STATES},
    errors::{CardPaymentError, PaymentValidationError, ProviderApiError, TransactionFlowError},
    payload::{self, AdapterOptions},
    payment_objects,
    provider_api::ProviderApi,
    transaction_flow_api::{TransactionFlowApi, DEFAULT_CANCEL_MESSAGE},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{DatabaseError, PartnerManagement, PaymentsDatabase, ProviderManagement, TransactionManagement};
