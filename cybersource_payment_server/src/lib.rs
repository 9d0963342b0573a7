//! # CyberSource payment server
//! This crate hosts the HTTP front-end of the CyberSource payment gateway. It is responsible for:
//! * Accepting card payment requests from the checkout page and handing them to the payment engine.
//! * Exposing a small, HMAC-protected admin API for managing transactions and the provider credentials.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payment/cybersource/process`: Processes a card payment. Always answers with a 200 and a JSON outcome.
//! * `/payment/cybersource/simulate_payment`: Legacy alias of `process`.
//! * `/admin/...`: Transaction and provider management. Requests must be signed, see [`middleware`].

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
