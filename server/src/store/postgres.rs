use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CheckIn, StoreResult, TicketStore};
use crate::models::{
    Admin, Event, EventSalesStats, EventStatus, MetadataType, NewAdmin, NewEvent,
    NewTransaction, Transaction,
};

const ADMIN_COLUMNS: &str =
    "id, email, mercadopago_access_token, mercadopago_public_key, phone";

const EVENT_COLUMNS: &str = "id, name, location, description, price, capacity, start_date, \
     end_purchase_date, has_menu, menu_moments, cover_image, status, created_by, created_at, \
     updated_at";

const TRANSACTION_COLUMNS: &str = "id, event_id, payment_id, price, quantity, name, last_name, \
     email, tel, selected_menus, transaction_date, verified, metadata_type";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn find_admin(&self, id: Uuid) -> StoreResult<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (id, email, mercadopago_access_token, mercadopago_public_key, \
             phone) VALUES ($1, $2, $3, $4, $5) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&admin.email)
        .bind(&admin.mercadopago_access_token)
        .bind(&admin.mercadopago_public_key)
        .bind(&admin.phone)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_event(&self, event: NewEvent) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (id, name, location, description, price, capacity, start_date, \
             end_purchase_date, has_menu, menu_moments, cover_image, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&event.name)
        .bind(&event.location)
        .bind(&event.description)
        .bind(event.price)
        .bind(event.capacity)
        .bind(event.start_date)
        .bind(event.end_purchase_date)
        .bind(event.has_menu)
        .bind(Json(&event.menu_moments))
        .bind(&event.cover_image)
        .bind(EventStatus::Active)
        .bind(event.created_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_date"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn list_events_by_admin(&self, admin_id: Uuid) -> StoreResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE created_by = $1 ORDER BY start_date"
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_event_status(&self, id: Uuid, status: EventStatus) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_transaction(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_transaction_by_payment_id(
        &self,
        payment_id: &str,
    ) -> StoreResult<Option<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE payment_id = $1"
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_transaction(&self, sale: NewTransaction) -> StoreResult<Option<Transaction>> {
        // A concurrent delivery of the same payment loses here instead of
        // failing on the unique index.
        sqlx::query_as::<_, Transaction>(&format!(
            "INSERT INTO transactions (id, event_id, payment_id, price, quantity, name, \
             last_name, email, tel, selected_menus, transaction_date, verified, metadata_type) \
             VALUES ($1, $2, $3, $4, 1, $5, $6, $7, $8, $9, NOW(), FALSE, $10) \
             ON CONFLICT (payment_id) DO NOTHING \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(sale.event_id)
        .bind(&sale.payment_id)
        .bind(sale.price)
        .bind(&sale.name)
        .bind(&sale.last_name)
        .bind(&sale.email)
        .bind(&sale.tel)
        .bind(Json(&sale.selected_menus))
        .bind(sale.metadata_type)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_transactions_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE event_id = $1 \
             ORDER BY transaction_date"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_transactions_for_event(&self, event_id: Uuid) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM transactions WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn sales_stats_for_admin(&self, admin_id: Uuid) -> StoreResult<Vec<EventSalesStats>> {
        sqlx::query_as::<_, EventSalesStats>(
            "SELECT e.id AS event_id, e.name AS event_name, \
             COUNT(t.id) AS transaction_count, \
             COALESCE(SUM(t.price), 0)::NUMERIC AS total_income \
             FROM transactions t \
             JOIN events e ON e.id = t.event_id \
             WHERE e.created_by = $1 \
             GROUP BY e.id, e.name \
             ORDER BY e.name",
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn check_in(&self, id: Uuid) -> StoreResult<CheckIn> {
        let updated = sqlx::query_as::<_, Transaction>(&format!(
            "UPDATE transactions SET verified = TRUE WHERE id = $1 AND verified = FALSE \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(transaction) = updated {
            return Ok(CheckIn::Verified(transaction));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM transactions WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(if exists {
            CheckIn::AlreadyVerified
        } else {
            CheckIn::NotFound
        })
    }

    async fn undo_check_in(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            "UPDATE transactions SET verified = FALSE WHERE id = $1 \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn reset_manual_check_ins(&self) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE transactions SET verified = FALSE \
             WHERE metadata_type = $1 AND verified = TRUE",
        )
        .bind(MetadataType::Manual)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
