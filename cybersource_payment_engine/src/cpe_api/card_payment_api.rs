use std::fmt::Debug;

use cpg_common::CYBERSOURCE_PROVIDER_CODE;
use cybersource_tools::{GatewayResponse, PaymentsClient};
use log::*;

use crate::{
    cpe_api::{
        card::CardDetails,
        errors::{CardPaymentError, PaymentValidationError},
        payload::{build_payment_request, AdapterOptions},
        payment_objects::{FlexValue, NotificationData, PaymentOutcome, PaymentRequest, SimulatedState},
        provider_api::ProviderApi,
        transaction_flow_api::TransactionFlowApi,
    },
    db_types::{Currency, Partner},
    events::EventProducers,
    traits::PaymentsDatabase,
};

/// Gateway status labels that count as an accepted payment
pub const SUCCESS_STATES: [&str; 3] = ["AUTHORIZED", "PENDING", "CAPTURED"];
pub const DEFAULT_DECLINE_REASON: &str = "unknown reason";
pub const DEFAULT_DECLINE_MESSAGE: &str = "CyberSource declined the payment request.";

/// The card payment adapter.
///
/// [`CardPaymentApi::process_payment`] validates a checkout request, sends it to CyberSource and reports the outcome to
/// the [`TransactionFlowApi`]. It keeps no state between calls: two requests with the same reference are two
/// independent payments.
pub struct CardPaymentApi<B, G> {
    db: B,
    gateway: G,
    flow: TransactionFlowApi<B>,
    providers: ProviderApi<B>,
    options: AdapterOptions,
}

impl<B, G> Debug for CardPaymentApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CardPaymentApi ({:?})", self.options)
    }
}

impl<B: Clone, G> CardPaymentApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        let flow = TransactionFlowApi::new(db.clone(), producers);
        let providers = ProviderApi::new(db.clone());
        Self { db, gateway, flow, providers, options: AdapterOptions::default() }
    }

    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> CardPaymentApi<B, G>
where
    B: PaymentsDatabase,
    G: PaymentsClient,
{
    /// Processes a card payment request. This never fails: every problem is reported in the returned outcome.
    pub async fn process_payment(&self, request: PaymentRequest) -> PaymentOutcome {
        match self.try_process_payment(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    CardPaymentError::Validation(_) | CardPaymentError::Configuration(_) => {
                        info!("💳️ Payment request rejected: {e}")
                    },
                    CardPaymentError::Notification(n) if n.is_validation_error() => {
                        warn!("💳️ Payment processed, but the transaction could not be updated: {e}")
                    },
                    _ => error!("💳️ Error processing CyberSource payment: {e}"),
                }
                PaymentOutcome::rejected(e.public_message())
            },
        }
    }

    async fn try_process_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome, CardPaymentError> {
        let reference = request.reference().ok_or(PaymentValidationError::MissingReference)?;
        let partner = self.resolve_partner(request.values.partner.as_ref()).await?;
        let currency = self.resolve_currency(request.values.currency.as_ref()).await?;
        let amount = parse_amount(request.values.amount.as_ref())?;
        let card = CardDetails::from_input(&request.customer_input)?;

        let payload = build_payment_request(&reference, &amount, &currency, &partner, &card, &self.options);
        let config = self.providers.gateway_config(CYBERSOURCE_PROVIDER_CODE).await?;
        info!(
            "💳️ Sending CyberSource payment for [{reference}]: {amount} {} with card {}",
            currency.name,
            card.masked_number()
        );
        if self.options.log_payloads {
            debug!("💳️ Payload for [{reference}]: {}", payload.masked());
        }
        let response = self.gateway.create_payment(&config, &payload).await?;
        info!("💳️ CyberSource responded to [{reference}] with {} {}", response.http_status, response.status_label());
        if self.options.log_payloads {
            debug!("💳️ Response for [{reference}]: {}", response.body);
        }
        self.handle_response(&reference, response).await
    }

    async fn handle_response(
        &self,
        reference: &str,
        response: GatewayResponse,
    ) -> Result<PaymentOutcome, CardPaymentError> {
        let status = response.status_label();
        if response.is_http_success() && SUCCESS_STATES.contains(&status.as_str()) {
            let state = if status == "PENDING" { SimulatedState::Pending } else { SimulatedState::Authorized };
            let data = NotificationData::new(reference, state);
            self.flow.handle_notification_data(CYBERSOURCE_PROVIDER_CODE, data).await?;
            info!("💳️ Payment [{reference}] accepted with gateway id {}", response.id().unwrap_or("(none)"));
            return Ok(PaymentOutcome::approved(status, response.body));
        }
        let info = response.error_information();
        let reason = info.reason.unwrap_or_else(|| DEFAULT_DECLINE_REASON.to_string());
        let message = info.message.unwrap_or_else(|| DEFAULT_DECLINE_MESSAGE.to_string());
        warn!("💳️ CyberSource rejected the payment [{reference}]: {message} ({reason})");
        let data = NotificationData::new(reference, SimulatedState::Declined).with_message(message.clone());
        self.flow.handle_notification_data(CYBERSOURCE_PROVIDER_CODE, data).await?;
        let status = if status.is_empty() { "DECLINED".to_string() } else { status };
        Ok(PaymentOutcome::declined(status, reason, message, response.body))
    }

    async fn resolve_partner(&self, id: Option<&FlexValue>) -> Result<Partner, CardPaymentError> {
        let id = id.and_then(FlexValue::as_id).ok_or(PaymentValidationError::PartnerNotFound)?;
        let partner = self.db.fetch_partner(id).await?.ok_or(PaymentValidationError::PartnerNotFound)?;
        Ok(partner)
    }

    async fn resolve_currency(&self, id: Option<&FlexValue>) -> Result<Currency, CardPaymentError> {
        let id = id.and_then(FlexValue::as_id).ok_or(PaymentValidationError::InvalidCurrency)?;
        let currency = self
            .db
            .fetch_currency(id)
            .await?
            .filter(|c| c.active && !c.name.trim().is_empty())
            .ok_or(PaymentValidationError::InvalidCurrency)?;
        Ok(currency)
    }
}

/// Validates the amount and returns it in the textual form that is sent to the gateway.
///
/// Only plain decimals (`12`, `12.5`, `.5`) are accepted. Exponents, signs and special values are invalid.
pub fn parse_amount(amount: Option<&FlexValue>) -> Result<String, PaymentValidationError> {
    let text = amount.map(|a| a.as_text().trim().to_string()).unwrap_or_default();
    if text.is_empty() {
        return Err(PaymentValidationError::MissingAmount);
    }
    let digits = text.chars().filter(char::is_ascii_digit).count();
    let points = text.chars().filter(|c| *c == '.').count();
    if digits == 0 || points > 1 || digits + points != text.len() {
        return Err(PaymentValidationError::InvalidAmount);
    }
    let value = text.parse::<f64>().map_err(|_| PaymentValidationError::InvalidAmount)?;
    if !value.is_finite() || value < 0.0 {
        return Err(PaymentValidationError::InvalidAmount);
    }
    if value == 0.0 {
        return Err(PaymentValidationError::MissingAmount);
    }
    Ok(text)
}
