use axum::extract::{Query, State};
use axum::response::{Redirect, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::checkout::{build_checkout, BuyerDetails};
use crate::provider::APPROVED;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct CreatePreferenceRequest {
    pub event_id: Uuid,
    #[serde(flatten)]
    pub buyer: BuyerDetails,
}

#[derive(Serialize)]
struct PreferenceCreated {
    id: String,
    init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentReturn {
    pub payment_id: Option<String>,
    pub status: Option<String>,
}

pub async fn create_preference(
    State(state): State<AppState>,
    Json(request): Json<CreatePreferenceRequest>,
) -> Result<Response, AppError> {
    request.buyer.validate()?;

    let event = state
        .store
        .find_event(request.event_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Event '{}' was not found", request.event_id))
        })?;

    if !event.is_on_sale(Utc::now()) {
        return Err(AppError::ValidationError(
            "Ticket sales for this event are closed".to_string(),
        ));
    }
    let sold = state.store.count_transactions_for_event(event.id).await?;
    if sold >= i64::from(event.capacity) {
        return Err(AppError::ValidationError("This event is sold out".to_string()));
    }
    event.validate_menu_selection(&request.buyer.selected_menus)?;

    let seller = state.store.find_admin(event.created_by).await?;
    let checkout = build_checkout(&event, seller.as_ref(), &request.buyer, &state.config);

    let created = state
        .provider
        .create_preference(&checkout.access_token, &checkout.preference)
        .await?;
    info!(event_id = %event.id, preference_id = %created.id, "Checkout preference created");

    Ok(success(
        PreferenceCreated {
            id: created.id,
            init_point: created.init_point,
        },
        "Preference created",
    ))
}

/// Browser landing point after checkout. The ticket itself is recorded by
/// the webhook, so this only routes the buyer to the right client page.
pub async fn payment_success(
    State(state): State<AppState>,
    Query(params): Query<PaymentReturn>,
) -> Redirect {
    let client_url = &state.config.client_url;

    match (params.status.as_deref(), params.payment_id) {
        (Some(APPROVED), Some(payment_id))
            if !payment_id.is_empty()
                && payment_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') =>
        {
            Redirect::to(&format!("{client_url}/payment_success?paymentId={payment_id}"))
        }
        (status, _) => {
            info!(?status, "Buyer returned without an approved payment");
            Redirect::to(&format!("{client_url}/payment_failure"))
        }
    }
}

pub async fn payment_failure(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("{}/payment_failure", state.config.client_url))
}

pub async fn payment_pending(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("{}/payment_pending", state.config.client_url))
}
