use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthAdmin;
use crate::models::{
    Event, EventStatus, MenuMoment, MetadataType, NewEvent, NewTransaction, SelectedMenus,
    Transaction,
};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub location: String,
    pub description: String,
    pub price: Decimal,
    pub capacity: i32,
    pub start_date: DateTime<Utc>,
    pub end_purchase_date: DateTime<Utc>,
    #[serde(default)]
    pub has_menu: bool,
    #[serde(default)]
    pub menu_moments: Vec<MenuMoment>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl CreateEventRequest {
    fn into_new_event(self, created_by: Uuid) -> Result<NewEvent, AppError> {
        if self.name.trim().is_empty() || self.location.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event name and location are required".to_string(),
            ));
        }
        if self.price.is_sign_negative() {
            return Err(AppError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        if self.capacity <= 0 {
            return Err(AppError::ValidationError(
                "Capacity must be positive".to_string(),
            ));
        }
        if self.end_purchase_date > self.start_date {
            return Err(AppError::ValidationError(
                "Ticket sales must close before the event starts".to_string(),
            ));
        }

        let menu_moments = if self.has_menu {
            if self.menu_moments.is_empty()
                || self.menu_moments.iter().any(|m| m.menu_options.is_empty())
            {
                return Err(AppError::ValidationError(
                    "Every menu moment needs at least one option".to_string(),
                ));
            }
            self.menu_moments
        } else {
            Vec::new()
        };

        Ok(NewEvent {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description,
            price: self.price,
            capacity: self.capacity,
            start_date: self.start_date,
            end_purchase_date: self.end_purchase_date,
            has_menu: self.has_menu,
            menu_moments,
            cover_image: self.cover_image.filter(|url| !url.trim().is_empty()),
            created_by,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ManualSaleRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub tel: String,
    /// Defaults to the event price.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub selected_menus: SelectedMenus,
}

#[derive(Serialize)]
struct EventSales {
    event_name: String,
    sales: Vec<Transaction>,
}

#[derive(Serialize)]
struct TransactionCount {
    transaction_count: i64,
}

/// Loads an event the caller must own.
pub(crate) async fn owned_event(
    state: &AppState,
    admin: AuthAdmin,
    event_id: Uuid,
) -> Result<Event, AppError> {
    let event = state
        .store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{event_id}' was not found")))?;

    if event.created_by != admin.0 {
        return Err(AppError::Forbidden(
            "This event belongs to another admin".to_string(),
        ));
    }

    Ok(event)
}

/// Lists every event, first moving each one to the status its purchase
/// cutoff implies.
pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut events = state.store.list_events().await?;
    let now = Utc::now();

    for event in events.iter_mut() {
        if let Some(status) = event.pending_transition(now) {
            state.store.set_event_status(event.id, status).await?;
            info!(event_id = %event.id, ?status, "Event status synchronised");
            event.status = status;
        }
    }

    Ok(success(events, "Events retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    let new_event = request.into_new_event(admin.0)?;
    let event = state.store.insert_event(new_event).await?;
    info!(event_id = %event.id, admin_id = %admin.0, "Event created");

    Ok(created(event, "Event created"))
}

pub async fn admin_events(
    State(state): State<AppState>,
    admin: AuthAdmin,
) -> Result<Response, AppError> {
    let events = state.store.list_events_by_admin(admin.0).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{event_id}' was not found")))?;

    Ok(success(event, "Event retrieved"))
}

pub async fn block_event(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    owned_event(&state, admin, event_id).await?;
    state
        .store
        .set_event_status(event_id, EventStatus::Blocked)
        .await?;
    info!(event_id = %event_id, "Event blocked");

    Ok(empty_success("Event blocked"))
}

pub async fn event_sales(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = owned_event(&state, admin, event_id).await?;
    let sales = state.store.list_transactions_for_event(event_id).await?;

    Ok(success(
        EventSales {
            event_name: event.name,
            sales,
        },
        "Sales retrieved",
    ))
}

pub async fn transaction_count(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let transaction_count = state.store.count_transactions_for_event(event_id).await?;
    Ok(success(
        TransactionCount { transaction_count },
        "Transaction count retrieved",
    ))
}

/// Records a sale taken outside the provider (cash, transfer). It starts
/// unchecked like any other ticket.
pub async fn create_manual_sale(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(event_id): Path<Uuid>,
    Json(request): Json<ManualSaleRequest>,
) -> Result<Response, AppError> {
    let event = owned_event(&state, admin, event_id).await?;

    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Buyer name and email are required".to_string(),
        ));
    }
    let price = request.price.unwrap_or(event.price);
    if price.is_sign_negative() {
        return Err(AppError::ValidationError(
            "Price cannot be negative".to_string(),
        ));
    }
    event.validate_menu_selection(&request.selected_menus)?;

    let sale = NewTransaction {
        event_id,
        payment_id: None,
        price,
        name: request.name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        email: request.email.trim().to_string(),
        tel: request.tel.trim().to_string(),
        selected_menus: request.selected_menus,
        metadata_type: MetadataType::Manual,
    };

    let transaction = state.store.insert_transaction(sale).await?.ok_or_else(|| {
        AppError::InternalServerError("Manual sale collided on payment id".to_string())
    })?;
    info!(transaction_id = %transaction.id, event_id = %event_id, "Manual sale recorded");

    Ok(created(transaction, "Manual sale recorded"))
}
