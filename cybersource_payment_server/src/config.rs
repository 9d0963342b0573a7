//! Server configuration
//!
//! All configuration is read from environment variables (a `.env` file is loaded first, if present). Invalid values
//! are logged and replaced by their defaults, so the server always starts with a usable configuration.
//!
//! See `cli-help.txt` for the full list of variables.
use std::env;

use cpg_common::{parse_boolean_flag, Secret};
use cybersource_payment_engine::{
    db_types::{ProviderState, ProviderUpdate},
    payload::DEFAULT_COUNTRY,
    AdapterOptions,
};
use cybersource_tools::RunEnvironment;
use log::*;

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 8460;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/cpg_store.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// Billing country for payers that have none on file
    pub default_country: String,
    pub log_gateway_payloads: bool,
    pub admin: AdminConfig,
    /// Credentials to write to the provider record at start-up
    pub cybersource: Option<CyberSourceSeed>,
}

#[derive(Clone, Debug, Default)]
pub struct AdminConfig {
    pub hmac_secret: Secret<String>,
    pub hmac_checks: bool,
}

/// CyberSource credentials supplied through the environment.
#[derive(Clone, Debug)]
pub struct CyberSourceSeed {
    pub merchant_id: String,
    pub key_id: String,
    pub secret_key: Secret<String>,
    pub environment: Option<RunEnvironment>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            default_country: DEFAULT_COUNTRY.to_string(),
            log_gateway_payloads: false,
            admin: AdminConfig { hmac_secret: Secret::default(), hmac_checks: true },
            cybersource: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup function.
    pub fn from_vars<F>(var: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let host = var("CPG_HOST").unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead."
                    );
                    DEFAULT_CPG_PORT
                })
            })
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = var("CPG_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ CPG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let use_x_forwarded_for = parse_boolean_flag(var("CPG_USE_X_FORWARDED_FOR"), false);
        let use_forwarded = parse_boolean_flag(var("CPG_USE_FORWARDED"), false);
        let default_country = var("CPG_DEFAULT_COUNTRY")
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| {
                let valid = s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic());
                if !valid {
                    warn!("🪛️ CPG_DEFAULT_COUNTRY must be a two-letter country code. Using {DEFAULT_COUNTRY} instead.");
                }
                valid
            })
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
        let log_gateway_payloads = parse_boolean_flag(var("CPG_LOG_GATEWAY_PAYLOADS"), false);
        let admin = AdminConfig::from_vars(&var);
        let cybersource = CyberSourceSeed::from_vars(&var);
        Self {
            host,
            port,
            database_url,
            use_x_forwarded_for,
            use_forwarded,
            default_country,
            log_gateway_payloads,
            admin,
            cybersource,
        }
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions { default_country: self.default_country.clone(), log_payloads: self.log_gateway_payloads }
    }
}

impl AdminConfig {
    fn from_vars<F>(var: &F) -> Self
    where F: Fn(&str) -> Option<String> {
        let hmac_secret = Secret::new(var("CPG_ADMIN_HMAC_SECRET").unwrap_or_default());
        let hmac_checks = parse_boolean_flag(var("CPG_ADMIN_HMAC_CHECKS"), true);
        match (hmac_checks, hmac_secret.is_empty()) {
            (true, true) => warn!(
                "🪛️ CPG_ADMIN_HMAC_SECRET is not set. All requests to the admin endpoints will be refused until it is."
            ),
            (false, _) => warn!(
                "🚨️🚨️🚨️ Admin HMAC checks are DISABLED. Anyone who can reach the server can manage transactions. \
                 🚨️🚨️🚨️"
            ),
            _ => {},
        }
        Self { hmac_secret, hmac_checks }
    }
}

impl CyberSourceSeed {
    fn from_vars<F>(var: &F) -> Option<Self>
    where F: Fn(&str) -> Option<String> {
        let value = |name: &str| var(name).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let merchant_id = value("CPG_CYBERSOURCE_MERCHANT_ID");
        let key_id = value("CPG_CYBERSOURCE_KEY_ID");
        let secret_key = value("CPG_CYBERSOURCE_SECRET_KEY");
        let environment = value("CPG_CYBERSOURCE_ENVIRONMENT").and_then(|s| {
            s.parse::<RunEnvironment>()
                .map_err(|e| warn!("🪛️ Ignoring CPG_CYBERSOURCE_ENVIRONMENT. {e}"))
                .ok()
        });
        match (merchant_id, key_id, secret_key) {
            (Some(merchant_id), Some(key_id), Some(secret_key)) => {
                Some(Self { merchant_id, key_id, secret_key: Secret::new(secret_key), environment })
            },
            (None, None, None) => {
                debug!("🪛️ No CyberSource credentials in the environment. Using the stored provider record.");
                None
            },
            _ => {
                warn!(
                    "🪛️ CPG_CYBERSOURCE_MERCHANT_ID, CPG_CYBERSOURCE_KEY_ID and CPG_CYBERSOURCE_SECRET_KEY must all be \
                     set to configure the provider from the environment. Ignoring them."
                );
                None
            },
        }
    }

    /// The provider update that writes these credentials. The provider state is only changed when an environment was
    /// given: `test` puts the provider in test mode and `production` enables it.
    pub fn provider_update(&self) -> ProviderUpdate {
        let update =
            ProviderUpdate::default().with_credentials(&self.merchant_id, &self.key_id, self.secret_key.clone());
        match self.environment {
            Some(RunEnvironment::Test) => update.with_state(ProviderState::Test),
            Some(RunEnvironment::Production) => update.with_state(ProviderState::Enabled),
            None => update,
        }
    }
}

//-------------------------------------------------  ProxyOptions  -----------------------------------------------------
/// The subset of the configuration needed to work out a client's address. It holds no secrets and can be shared with
/// the request handlers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ProxyOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
