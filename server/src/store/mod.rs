//! Persistence for admins, events and transactions.
//!
//! Handlers and the payment reconciler only see [`TicketStore`]; production
//! runs on [`PgStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Admin, Event, EventSalesStats, EventStatus, NewAdmin, NewEvent, NewTransaction,
    Transaction,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Result of trying to check a ticket in.
#[derive(Debug, Clone)]
pub enum CheckIn {
    Verified(Transaction),
    AlreadyVerified,
    NotFound,
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn find_admin(&self, id: Uuid) -> StoreResult<Option<Admin>>;

    /// Fails on a duplicate email.
    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<Admin>;

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event>;

    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn list_events_by_admin(&self, admin_id: Uuid) -> StoreResult<Vec<Event>>;

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    /// Returns `false` when no event has this id.
    async fn set_event_status(&self, id: Uuid, status: EventStatus) -> StoreResult<bool>;

    async fn find_transaction(&self, id: Uuid) -> StoreResult<Option<Transaction>>;

    async fn find_transaction_by_payment_id(
        &self,
        payment_id: &str,
    ) -> StoreResult<Option<Transaction>>;

    /// Inserts a sale. Returns `None` when another transaction already holds
    /// the same payment id.
    async fn insert_transaction(&self, sale: NewTransaction) -> StoreResult<Option<Transaction>>;

    async fn list_transactions_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Transaction>>;

    async fn count_transactions_for_event(&self, event_id: Uuid) -> StoreResult<i64>;

    async fn sales_stats_for_admin(&self, admin_id: Uuid) -> StoreResult<Vec<EventSalesStats>>;

    /// Sets `verified` only if it is currently unset.
    async fn check_in(&self, id: Uuid) -> StoreResult<CheckIn>;

    async fn undo_check_in(&self, id: Uuid) -> StoreResult<Option<Transaction>>;

    /// Clears `verified` on every manual sale, returning how many changed.
    async fn reset_manual_check_ins(&self) -> StoreResult<u64>;
}
