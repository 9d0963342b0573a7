use crate::{
    db_types::{PaymentProvider, ProviderUpdate},
    traits::DatabaseError,
};

#[allow(async_fn_in_trait)]
pub trait ProviderManagement {
    /// Fetches the provider record with the given code, e.g. `cybersource`.
    async fn fetch_provider(&self, code: &str) -> Result<Option<PaymentProvider>, DatabaseError>;

    /// Applies the non-empty fields of `update` to the provider record and returns the updated record.
    ///
    /// Returns [`DatabaseError::ProviderNotFound`] if there is no provider with the given code.
    async fn update_provider(&self, code: &str, update: ProviderUpdate) -> Result<PaymentProvider, DatabaseError>;
}
