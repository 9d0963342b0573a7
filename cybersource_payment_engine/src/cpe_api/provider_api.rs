use std::{fmt::Debug, time::Duration};

use cybersource_tools::{CyberSourceConfig, RunEnvironment, DEFAULT_GATEWAY_TIMEOUT};
use log::*;

use crate::{
    cpe_api::errors::ProviderApiError,
    db_types::{PaymentProvider, ProviderState, ProviderUpdate},
    traits::ProviderManagement,
};

/// Reads and maintains the provider (merchant credential) record.
///
/// The gateway configuration is read from the database on every call, so credential updates take effect on the very
/// next payment.
pub struct ProviderApi<B> {
    db: B,
}

impl<B> Debug for ProviderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProviderApi")
    }
}

impl<B> ProviderApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProviderApi<B>
where B: ProviderManagement
{
    pub async fn fetch_provider(&self, code: &str) -> Result<Option<PaymentProvider>, ProviderApiError> {
        let provider = self.db.fetch_provider(code).await?;
        Ok(provider)
    }

    /// Builds the gateway configuration for the provider with the given code.
    ///
    /// Fails if the provider does not exist, has incomplete credentials, or is disabled.
    pub async fn gateway_config(&self, code: &str) -> Result<CyberSourceConfig, ProviderApiError> {
        let provider = self.db.fetch_provider(code).await?.ok_or(ProviderApiError::NotConfigured)?;
        let missing = provider.missing_credentials();
        if !missing.is_empty() {
            warn!("🪛️ Provider {code} is missing credentials: {}", missing.join(", "));
            return Err(ProviderApiError::MissingCredentials(missing));
        }
        let environment = match provider.state {
            ProviderState::Disabled => return Err(ProviderApiError::Disabled),
            ProviderState::Test => RunEnvironment::Test,
            ProviderState::Enabled => RunEnvironment::Production,
        };
        let timeout = match u64::try_from(provider.timeout_secs) {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!("🪛️ Provider {code} has an invalid timeout ({}). Using the default.", provider.timeout_secs);
                DEFAULT_GATEWAY_TIMEOUT
            },
        };
        let config = CyberSourceConfig::new(provider.merchant_id.trim(), provider.key_id.trim(), provider.secret_key)
            .with_environment(environment)
            .with_timeout(timeout);
        trace!("🪛️ Gateway configuration for {code}: {config:?}");
        Ok(config)
    }

    pub async fn update_credentials(
        &self,
        code: &str,
        update: ProviderUpdate,
    ) -> Result<PaymentProvider, ProviderApiError> {
        let provider = self.db.update_provider(code, update).await?;
        info!("🪛️ Provider {code} updated. State: {}, manual capture: {}", provider.state, provider.capture_manually);
        Ok(provider)
    }
}
