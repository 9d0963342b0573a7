//! # CyberSource tools
//!
//! A thin client for the CyberSource REST payments API. It knows how to
//! * describe a merchant's gateway credentials ([`CyberSourceConfig`]),
//! * sign a request with the CyberSource HTTP-signature scheme ([`signature`]),
//! * serialize a card payment request and read back the gateway's response ([`data_objects`]).
//!
//! The [`PaymentsClient`] trait is the seam used by the payment engine, so that the gateway can be replaced with a
//! mock in tests.
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod signature;

pub use api::{CyberSourceApi, PaymentsClient, PAYMENTS_RESOURCE};
pub use config::{CyberSourceConfig, RunEnvironment, DEFAULT_GATEWAY_TIMEOUT};
pub use data_objects::{CreatePaymentRequest, ErrorInformation, GatewayResponse};
pub use error::CyberSourceApiError;
