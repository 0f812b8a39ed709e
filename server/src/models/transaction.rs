use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Menu moment index (as a string) to the chosen menu label.
pub type SelectedMenus = BTreeMap<String, String>;

/// Where a sale came from. Provider sales always carry a payment id, manual
/// sales never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "metadata_type", rename_all = "lowercase")]
pub enum MetadataType {
    Manual,
    Mercadopago,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub event_id: Uuid,
    pub payment_id: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub tel: String,
    pub selected_menus: Json<SelectedMenus>,
    pub transaction_date: DateTime<Utc>,
    pub verified: bool,
    pub metadata_type: MetadataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub event_id: Uuid,
    pub payment_id: Option<String>,
    pub price: Decimal,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub tel: String,
    pub selected_menus: SelectedMenus,
    pub metadata_type: MetadataType,
}

impl NewTransaction {
    pub fn into_transaction(self, id: Uuid, transaction_date: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            event_id: self.event_id,
            payment_id: self.payment_id,
            price: self.price,
            quantity: 1,
            name: self.name,
            last_name: self.last_name,
            email: self.email,
            tel: self.tel,
            selected_menus: Json(self.selected_menus),
            transaction_date,
            verified: false,
            metadata_type: self.metadata_type,
        }
    }
}

/// Sales totals of one event, as shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct EventSalesStats {
    pub event_id: Uuid,
    pub event_name: String,
    pub transaction_count: i64,
    pub total_income: Decimal,
}
