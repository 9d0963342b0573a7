use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde_json::Value;

use crate::{
    signature::sign_post_request,
    CreatePaymentRequest,
    CyberSourceApiError,
    CyberSourceConfig,
    GatewayResponse,
};

pub const PAYMENTS_RESOURCE: &str = "/pts/v2/payments";

/// The subset of the CyberSource API used by the payment engine.
#[allow(async_fn_in_trait)]
pub trait PaymentsClient {
    /// Submits a card payment. Any response the gateway sends back (including declines with a 4xx status) is returned
    /// as a [`GatewayResponse`]. Errors are reserved for transport failures and unreadable responses.
    async fn create_payment(
        &self,
        config: &CyberSourceConfig,
        request: &CreatePaymentRequest,
    ) -> Result<GatewayResponse, CyberSourceApiError>;
}

#[derive(Clone)]
pub struct CyberSourceApi {
    client: Arc<Client>,
}

impl CyberSourceApi {
    pub fn new() -> Result<Self, CyberSourceApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Content-Type", HeaderValue::from_static("application/json;charset=utf-8"));
        headers.insert("Accept", HeaderValue::from_static("application/hal+json;charset=utf-8"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CyberSourceApiError::Initialization(e.to_string()))?;
        Ok(Self { client: Arc::new(client) })
    }

    pub fn url(config: &CyberSourceConfig, path: &str) -> String {
        format!("https://{}{path}", config.host())
    }

    /// Builds the signed authentication headers for a POST of `body` to `resource`.
    pub fn auth_headers(
        config: &CyberSourceConfig,
        resource: &str,
        body: &[u8],
        time: DateTime<Utc>,
    ) -> Result<HeaderMap, CyberSourceApiError> {
        let signed = sign_post_request(config, resource, body, time)?;
        let mut headers = HeaderMap::with_capacity(5);
        let pairs = [
            ("v-c-merchant-id", signed.merchant_id),
            ("date", signed.date),
            ("host", signed.host),
            ("digest", signed.digest),
            ("signature", signed.signature),
        ];
        for (name, value) in pairs {
            let value = HeaderValue::from_str(&value)
                .map_err(|e| CyberSourceApiError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(headers)
    }
}

impl PaymentsClient for CyberSourceApi {
    async fn create_payment(
        &self,
        config: &CyberSourceConfig,
        request: &CreatePaymentRequest,
    ) -> Result<GatewayResponse, CyberSourceApiError> {
        let body = serde_json::to_vec(request).map_err(|e| CyberSourceApiError::JsonError(e.to_string()))?;
        let headers = Self::auth_headers(config, PAYMENTS_RESOURCE, &body, Utc::now())?;
        let url = Self::url(config, PAYMENTS_RESOURCE);
        trace!("💳️ Sending payment request to {url}");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .timeout(config.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CyberSourceApiError::Timeout(e.to_string())
                } else {
                    CyberSourceApiError::RestRequestError(e.to_string())
                }
            })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| CyberSourceApiError::RestResponseError(e.to_string()))?;
        debug!("💳️ CyberSource responded with status {status}");
        let body = serde_json::from_str::<Value>(&text)
            .map_err(|e| CyberSourceApiError::InvalidResponse { status, message: e.to_string() })?;
        Ok(GatewayResponse::new(status, body))
    }
}
