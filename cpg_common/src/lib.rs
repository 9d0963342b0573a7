mod helpers;
mod secret;

pub use helpers::{mask_card_number, parse_boolean_flag};
pub use secret::Secret;

/// The provider code under which the CyberSource gateway is registered in the order system.
pub const CYBERSOURCE_PROVIDER_CODE: &str = "cybersource";
