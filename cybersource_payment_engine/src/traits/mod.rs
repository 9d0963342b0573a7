//! # Order-system backend contracts
//!
//! The payment engine never talks to a database directly. The APIs in [`crate::cpe_api`] are generic over backends that
//! implement the traits in this module.
//!
//! * [`PartnerManagement`] resolves the payer and the currency of a payment request.
//! * [`ProviderManagement`] reads and writes the CyberSource provider (merchant credential) record.
//! * [`TransactionManagement`] stores payment transactions and their state-change audit log.
//! * [`PaymentsDatabase`] ties the three together and is what the payment APIs require.
mod partner_management;
mod payments_database;
mod provider_management;
mod transaction_management;

pub use partner_management::PartnerManagement;
pub use payments_database::{DatabaseError, PaymentsDatabase};
pub use provider_management::ProviderManagement;
pub use transaction_management::{StateUpdate, TransactionManagement};
