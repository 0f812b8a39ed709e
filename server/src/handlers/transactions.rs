use axum::extract::{Path, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthAdmin;
use crate::handlers::events::owned_event;
use crate::models::{SelectedMenus, Transaction};
use crate::state::AppState;
use crate::store::CheckIn;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// What the gate screen shows after scanning a ticket.
#[derive(Serialize)]
struct TicketLookup {
    transaction_id: Uuid,
    event_id: Uuid,
    event_name: Option<String>,
    name: String,
    last_name: String,
    price: Decimal,
    selected_menus: SelectedMenus,
    verified: bool,
}

fn ticket_not_found(transaction_id: Uuid) -> AppError {
    AppError::NotFound(format!("Ticket '{transaction_id}' was not found"))
}

/// Loads a transaction whose event the caller owns.
async fn owned_transaction(
    state: &AppState,
    admin: AuthAdmin,
    transaction_id: Uuid,
) -> Result<Transaction, AppError> {
    let transaction = state
        .store
        .find_transaction(transaction_id)
        .await?
        .ok_or_else(|| ticket_not_found(transaction_id))?;
    owned_event(state, admin, transaction.event_id).await?;

    Ok(transaction)
}

pub async fn sales_stats(
    State(state): State<AppState>,
    admin: AuthAdmin,
) -> Result<Response, AppError> {
    let stats = state.store.sales_stats_for_admin(admin.0).await?;
    Ok(success(stats, "Sales statistics retrieved"))
}

pub async fn lookup_ticket(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let transaction = state
        .store
        .find_transaction(transaction_id)
        .await?
        .ok_or_else(|| ticket_not_found(transaction_id))?;
    let event = state.store.find_event(transaction.event_id).await?;

    Ok(success(
        TicketLookup {
            transaction_id: transaction.id,
            event_id: transaction.event_id,
            event_name: event.map(|event| event.name),
            name: transaction.name,
            last_name: transaction.last_name,
            price: transaction.price,
            selected_menus: transaction.selected_menus.0,
            verified: transaction.verified,
        },
        "Ticket found",
    ))
}

pub async fn check_in(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, AppError> {
    owned_transaction(&state, admin, transaction_id).await?;

    match state.store.check_in(transaction_id).await? {
        CheckIn::Verified(transaction) => {
            info!(%transaction_id, "Ticket checked in");
            Ok(success(transaction, "Ticket checked in"))
        }
        CheckIn::AlreadyVerified => Err(AppError::Conflict(
            "Ticket has already been checked in".to_string(),
        )),
        CheckIn::NotFound => Err(ticket_not_found(transaction_id)),
    }
}

pub async fn undo_check_in(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, AppError> {
    owned_transaction(&state, admin, transaction_id).await?;

    let transaction = state
        .store
        .undo_check_in(transaction_id)
        .await?
        .ok_or_else(|| ticket_not_found(transaction_id))?;
    info!(%transaction_id, "Ticket check-in reverted");

    Ok(success(transaction, "Ticket check-in reverted"))
}
