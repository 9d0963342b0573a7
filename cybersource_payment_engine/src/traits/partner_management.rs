use crate::{
    db_types::{Currency, NewPartner, Partner},
    traits::DatabaseError,
};

/// Lookups for the customer and currency records that a payment request refers to.
#[allow(async_fn_in_trait)]
pub trait PartnerManagement {
    async fn fetch_partner(&self, id: i64) -> Result<Option<Partner>, DatabaseError>;

    async fn insert_partner(&self, partner: NewPartner) -> Result<Partner, DatabaseError>;

    async fn fetch_currency(&self, id: i64) -> Result<Option<Currency>, DatabaseError>;
}
