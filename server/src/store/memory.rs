use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use super::{CheckIn, StoreResult, TicketStore};
use crate::models::{
    Admin, Event, EventSalesStats, EventStatus, MetadataType, NewAdmin, NewEvent,
    NewTransaction, Transaction,
};

#[derive(Default)]
struct Tables {
    admins: HashMap<Uuid, Admin>,
    events: HashMap<Uuid, Event>,
    transactions: Vec<Transaction>,
}

/// Store used by the test suite. Enforces the same payment id uniqueness as
/// the database.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_admin(&self, admin: Admin) {
        self.tables.lock().unwrap().admins.insert(admin.id, admin);
    }

    pub fn add_event(&self, event: Event) {
        self.tables.lock().unwrap().events.insert(event.id, event);
    }

    pub fn add_transaction(&self, transaction: Transaction) {
        self.tables.lock().unwrap().transactions.push(transaction);
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.tables.lock().unwrap().transactions.clone()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn find_admin(&self, id: Uuid) -> StoreResult<Option<Admin>> {
        Ok(self.tables.lock().unwrap().admins.get(&id).cloned())
    }

    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let mut tables = self.tables.lock().unwrap();
        if tables.admins.values().any(|a| a.email == admin.email) {
            return Err(sqlx::Error::Protocol(format!(
                "duplicate admin email {}",
                admin.email
            )));
        }

        let admin = Admin {
            id: Uuid::new_v4(),
            email: admin.email,
            mercadopago_access_token: admin.mercadopago_access_token,
            mercadopago_public_key: admin.mercadopago_public_key,
            phone: admin.phone,
        };
        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: event.name,
            location: event.location,
            description: event.description,
            price: event.price,
            capacity: event.capacity,
            start_date: event.start_date,
            end_purchase_date: event.end_purchase_date,
            has_menu: event.has_menu,
            menu_moments: Json(event.menu_moments),
            cover_image: event.cover_image,
            status: EventStatus::Active,
            created_by: event.created_by,
            created_at: now,
            updated_at: now,
        };
        self.add_event(event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self.tables.lock().unwrap().events.values().cloned().collect();
        events.sort_by_key(|event| event.start_date);
        Ok(events)
    }

    async fn list_events_by_admin(&self, admin_id: Uuid) -> StoreResult<Vec<Event>> {
        let mut events = self.list_events().await?;
        events.retain(|event| event.created_by == admin_id);
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self.tables.lock().unwrap().events.get(&id).cloned())
    }

    async fn set_event_status(&self, id: Uuid, status: EventStatus) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.events.get_mut(&id) {
            Some(event) => {
                event.status = status;
                event.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn find_transaction(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn find_transaction_by_payment_id(
        &self,
        payment_id: &str,
    ) -> StoreResult<Option<Transaction>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .transactions
            .iter()
            .find(|t| t.payment_id.as_deref() == Some(payment_id))
            .cloned())
    }

    async fn insert_transaction(&self, sale: NewTransaction) -> StoreResult<Option<Transaction>> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.events.contains_key(&sale.event_id) {
            // Mirrors the foreign key on transactions.event_id.
            return Err(sqlx::Error::RowNotFound);
        }
        if let Some(payment_id) = sale.payment_id.as_deref() {
            if tables
                .transactions
                .iter()
                .any(|t| t.payment_id.as_deref() == Some(payment_id))
            {
                return Ok(None);
            }
        }

        let transaction = sale.into_transaction(Uuid::new_v4(), Utc::now());
        tables.transactions.push(transaction.clone());
        Ok(Some(transaction))
    }

    async fn list_transactions_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Transaction>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .transactions
            .iter()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn count_transactions_for_event(&self, event_id: Uuid) -> StoreResult<i64> {
        Ok(self.list_transactions_for_event(event_id).await?.len() as i64)
    }

    async fn sales_stats_for_admin(&self, admin_id: Uuid) -> StoreResult<Vec<EventSalesStats>> {
        let tables = self.tables.lock().unwrap();
        let mut stats: Vec<EventSalesStats> = tables
            .events
            .values()
            .filter(|event| event.created_by == admin_id)
            .filter_map(|event| {
                let sales: Vec<&Transaction> = tables
                    .transactions
                    .iter()
                    .filter(|t| t.event_id == event.id)
                    .collect();
                (!sales.is_empty()).then(|| EventSalesStats {
                    event_id: event.id,
                    event_name: event.name.clone(),
                    transaction_count: sales.len() as i64,
                    total_income: sales.iter().map(|t| t.price).sum::<Decimal>(),
                })
            })
            .collect();
        stats.sort_by(|a, b| a.event_name.cmp(&b.event_name));
        Ok(stats)
    }

    async fn check_in(&self, id: Uuid) -> StoreResult<CheckIn> {
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.transactions.iter_mut().find(|t| t.id == id) {
            Some(t) if t.verified => CheckIn::AlreadyVerified,
            Some(t) => {
                t.verified = true;
                CheckIn::Verified(t.clone())
            }
            None => CheckIn::NotFound,
        })
    }

    async fn undo_check_in(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.transactions.iter_mut().find(|t| t.id == id).map(|t| {
            t.verified = false;
            t.clone()
        }))
    }

    async fn reset_manual_check_ins(&self) -> StoreResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let mut changed = 0;
        for transaction in tables
            .transactions
            .iter_mut()
            .filter(|t| t.metadata_type == MetadataType::Manual && t.verified)
        {
            transaction.verified = false;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::on_sale_event;

    fn manual_sale(event_id: Uuid) -> NewTransaction {
        NewTransaction {
            event_id,
            payment_id: None,
            price: Decimal::new(2500, 0),
            name: "Luis".to_string(),
            last_name: "Pérez".to_string(),
            email: "luis@example.com".to_string(),
            tel: String::new(),
            selected_menus: Default::default(),
            metadata_type: MetadataType::Manual,
        }
    }

    fn new_admin(email: &str) -> NewAdmin {
        NewAdmin {
            email: email.to_string(),
            mercadopago_access_token: "APP_USR-seller".to_string(),
            mercadopago_public_key: "APP_USR-public".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_sale_for_unknown_event_is_rejected() {
        let store = MemoryStore::new();

        let result = store.insert_transaction(manual_sale(Uuid::new_v4())).await;

        assert!(result.is_err());
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_admin_emails_are_unique() {
        let store = MemoryStore::new();

        let admin = store.insert_admin(new_admin("seller@example.com")).await.unwrap();
        assert_eq!(
            store.find_admin(admin.id).await.unwrap().map(|a| a.email),
            Some("seller@example.com".to_string())
        );
        assert!(store.insert_admin(new_admin("seller@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_touches_only_checked_in_manual_sales() {
        let store = MemoryStore::new();
        let event = on_sale_event(Uuid::new_v4());
        store.add_event(event.clone());

        let manual = store
            .insert_transaction(manual_sale(event.id))
            .await
            .unwrap()
            .unwrap();
        let untouched = store
            .insert_transaction(manual_sale(event.id))
            .await
            .unwrap()
            .unwrap();
        let paid = store
            .insert_transaction(NewTransaction {
                payment_id: Some("321".to_string()),
                metadata_type: MetadataType::Mercadopago,
                ..manual_sale(event.id)
            })
            .await
            .unwrap()
            .unwrap();
        store.check_in(manual.id).await.unwrap();
        store.check_in(paid.id).await.unwrap();

        assert_eq!(store.reset_manual_check_ins().await.unwrap(), 1);

        let verified = |id: Uuid| {
            store
                .transactions()
                .into_iter()
                .find(|t| t.id == id)
                .map(|t| t.verified)
        };
        assert_eq!(verified(manual.id), Some(false));
        assert_eq!(verified(untouched.id), Some(false));
        assert_eq!(verified(paid.id), Some(true));
    }
}
