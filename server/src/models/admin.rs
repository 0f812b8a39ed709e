use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An event owner. The provider credentials route a sale's money to this
/// seller's account instead of the platform's.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub mercadopago_access_token: String,
    pub mercadopago_public_key: String,
    pub phone: Option<String>,
}

impl Admin {
    /// The seller's own access token, if one is configured.
    pub fn seller_access_token(&self) -> Option<&str> {
        let token = self.mercadopago_access_token.trim();
        (!token.is_empty()).then_some(token)
    }
}

/// A seller account as registered by an operator.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub mercadopago_access_token: String,
    pub mercadopago_public_key: String,
    pub phone: Option<String>,
}
