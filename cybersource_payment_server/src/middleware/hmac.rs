//! HMAC middleware for Actix Web.
//!
//! Requests to the admin endpoints must be signed by the caller. The signature is the base64-encoded HMAC-SHA256 of
//! the raw request body, keyed with `CPG_ADMIN_HMAC_SECRET`, and is sent in the `X-Cpg-Hmac-Sha256` header. Requests
//! without a body (e.g. `GET`) sign the empty string.
//!
//! If no secret has been configured, every request is refused. Checks can be switched off entirely with
//! `CPG_ADMIN_HMAC_CHECKS=false`, which is only meant for local development.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    web,
    Error,
};
use bytes::Bytes;
use cpg_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};

use crate::helpers::verify_hmac;

pub const ADMIN_HMAC_HEADER: &str = "X-Cpg-Hmac-Sha256";

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    key: Secret<String>,
    // If false, then the middleware will not check the HMAC signature and always allow the call
    enabled: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, key: Secret<String>, enabled: bool) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            key: self.key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        if !self.enabled {
            trace!("🔐️ HMAC checks are disabled. Allowing request to {}.", req.path());
            return Box::pin(async move { service.call(req).await });
        }
        let key = self.key.clone();
        let hmac_header = self.hmac_header.clone();
        Box::pin(async move {
            let req = authorize(req, &hmac_header, &key).await?;
            service.call(req).await
        })
    }
}

/// Reads the body, checks it against the signature header and puts the body back for the handler.
async fn authorize(mut req: ServiceRequest, hmac_header: &str, key: &Secret<String>) -> Result<ServiceRequest, Error> {
    if key.is_empty() {
        warn!("🔐️ No admin HMAC secret has been configured. Denying access to {}.", req.path());
        return Err(ErrorForbidden("Admin access has not been configured."));
    }
    let body = req.extract::<web::Bytes>().await.map_err(|e| {
        warn!("🔐️ Could not read the body of {}: {e:?}", req.path());
        ErrorBadRequest("Failed to extract request data.")
    })?;
    let Some(header) = req.headers().get(hmac_header) else {
        warn!("🔐️ No HMAC signature on request to {}. Denying access.", req.path());
        return Err(ErrorForbidden("No HMAC signature found."));
    };
    let valid = header.to_str().map(|sig| verify_hmac(key.reveal(), body.as_ref(), sig)).unwrap_or(false);
    if !valid {
        warn!("🔐️ Invalid HMAC signature on request to {}. Denying access.", req.path());
        return Err(ErrorForbidden("Invalid HMAC signature."));
    }
    trace!("🔐️ HMAC check for {} ✅️", req.path());
    req.set_payload(bytes_to_payload(body));
    Ok(req)
}

fn bytes_to_payload(buf: Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
