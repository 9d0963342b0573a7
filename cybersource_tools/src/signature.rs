//! CyberSource HTTP-signature authentication.
//!
//! Every request carries a `Signature` header: an HMAC-SHA256 over a canonical "signing string" built from the host,
//! date, request target, body digest and merchant id. The HMAC key is the base64-decoded shared secret.
//!
//! ```text
//! host: apitest.cybersource.com
//! date: Thu, 29 Feb 2024 13:30:00 GMT
//! (request-target): post /pts/v2/payments
//! digest: SHA-256=<base64(sha256(body))>
//! v-c-merchant-id: <merchant id>
//! ```
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::trace;
use sha2::{Digest, Sha256};

use crate::{CyberSourceApiError, CyberSourceConfig};

pub const SIGNED_HEADERS: &str = "host date (request-target) digest v-c-merchant-id";
pub const SIGNATURE_ALGORITHM: &str = "HmacSHA256";

/// The set of authentication headers for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub host: String,
    pub date: String,
    pub digest: String,
    pub merchant_id: String,
    pub signature: String,
}

/// base64 encoded SHA-256 digest of the request body
pub fn payload_digest(body: &[u8]) -> String {
    base64::encode(Sha256::digest(body))
}

/// Formats a timestamp as an RFC 7231 HTTP date
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn signing_string(host: &str, date: &str, resource: &str, digest: &str, merchant_id: &str) -> String {
    format!(
        "host: {host}\ndate: {date}\n(request-target): post {resource}\ndigest: SHA-256={digest}\nv-c-merchant-id: \
         {merchant_id}"
    )
}

/// Signs a POST request to `resource` with the given body.
pub fn sign_post_request(
    config: &CyberSourceConfig,
    resource: &str,
    body: &[u8],
    time: DateTime<Utc>,
) -> Result<SignedHeaders, CyberSourceApiError> {
    let host = config.host().to_string();
    let date = http_date(time);
    let digest = payload_digest(body);
    let message = signing_string(&host, &date, resource, &digest, &config.merchant_id);
    let key = base64::decode(config.secret_key.reveal().trim())
        .map_err(|e| CyberSourceApiError::InvalidSecretKey(e.to_string()))?;
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&key).map_err(|e| CyberSourceApiError::InvalidSecretKey(e.to_string()))?;
    mac.update(message.as_bytes());
    let signature_value = base64::encode(mac.finalize().into_bytes());
    trace!("🔐️ Signed request to {resource} for merchant {}", config.merchant_id);
    let signature = format!(
        r#"keyid="{}", algorithm="{SIGNATURE_ALGORITHM}", headers="{SIGNED_HEADERS}", signature="{signature_value}""#,
        config.key_id
    );
    Ok(SignedHeaders {
        host,
        date,
        digest: format!("SHA-256={digest}"),
        merchant_id: config.merchant_id.clone(),
        signature,
    })
}
