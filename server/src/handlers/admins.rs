use axum::extract::{Path, State};
use axum::response::Response;
use serde::Serialize;
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct PublicKeyPayload {
    public_key: String,
}

/// The storefront needs the seller's public key to render the checkout.
pub async fn public_key(
    State(state): State<AppState>,
    Path(admin_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let admin = state
        .store
        .find_admin(admin_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Admin '{admin_id}' was not found")))?;

    Ok(success(
        PublicKeyPayload {
            public_key: admin.mercadopago_public_key,
        },
        "Public key retrieved",
    ))
}
