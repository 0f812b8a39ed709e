//! Payment provider boundary: payment lookups for reconciliation and
//! checkout preference creation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SelectedMenus;

pub mod mercadopago;

pub use mercadopago::MercadoPagoClient;

pub const APPROVED: &str = "approved";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// Buyer and order fields attached to a checkout and echoed back on the
/// resulting payment. Keys are snake_case so the provider returns them as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_menus: Option<SelectedMenus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub status: String,
    pub transaction_amount: Decimal,
    #[serde(default)]
    pub metadata: Option<PaymentMetadata>,
}

impl Payment {
    pub fn is_approved(&self) -> bool {
        self.status == APPROVED
    }

    pub fn metadata(&self) -> PaymentMetadata {
        self.metadata.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub currency_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayerPhone {
    pub number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payer {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PayerPhone>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub payer: Payer,
    pub metadata: PaymentMetadata,
    pub back_urls: BackUrls,
    pub auto_return: String,
    pub external_reference: String,
    pub notification_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub id: String,
    #[serde(default)]
    pub init_point: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Looks a payment up with the given credentials. `Ok(None)` means the
    /// provider does not know the payment (yet).
    async fn get_payment(
        &self,
        access_token: &str,
        payment_id: &str,
    ) -> Result<Option<Payment>, ProviderError>;

    async fn create_preference(
        &self,
        access_token: &str,
        preference: &PreferenceRequest,
    ) -> Result<PreferenceResponse, ProviderError>;
}
