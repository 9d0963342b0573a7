use cybersource_tools::{CreatePaymentRequest, CyberSourceApiError, CyberSourceConfig, GatewayResponse, PaymentsClient};
use mockall::mock;

mock! {
    pub Gateway {}
    impl PaymentsClient for Gateway {
        async fn create_payment(
            &self,
            config: &CyberSourceConfig,
            request: &CreatePaymentRequest,
        ) -> Result<GatewayResponse, CyberSourceApiError>;
    }
}
