use std::{fmt::Display, str::FromStr, time::Duration};

use cpg_common::Secret;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(60);

/// The CyberSource environment that requests are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunEnvironment {
    #[default]
    Test,
    Production,
}

impl RunEnvironment {
    pub fn host(&self) -> &'static str {
        match self {
            Self::Test => "apitest.cybersource.com",
            Self::Production => "api.cybersource.com",
        }
    }
}

impl Display for RunEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for RunEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "sandbox" | "apitest.cybersource.com" => Ok(Self::Test),
            "production" | "live" | "api.cybersource.com" => Ok(Self::Production),
            other => Err(format!("{other} is not a valid CyberSource environment")),
        }
    }
}

/// Everything needed to sign and send a request on behalf of a merchant.
#[derive(Debug, Clone)]
pub struct CyberSourceConfig {
    pub merchant_id: String,
    pub key_id: String,
    /// The base64-encoded shared secret paired with `key_id`
    pub secret_key: Secret<String>,
    pub environment: RunEnvironment,
    pub timeout: Duration,
}

impl CyberSourceConfig {
    pub fn new(merchant_id: &str, key_id: &str, secret_key: Secret<String>) -> Self {
        Self {
            merchant_id: merchant_id.to_string(),
            key_id: key_id.to_string(),
            secret_key,
            environment: RunEnvironment::default(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }

    pub fn with_environment(mut self, environment: RunEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &'static str {
        self.environment.host()
    }
}
