use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::{debug, info};

use crate::state::AppState;
use crate::utils::error::AppError;

const PAYMENT_NOTIFICATION: &str = "payment";

/// Provider notification body, `{ "type": "payment", "data": { "id": ... } }`.
///
/// Read from a raw JSON value: the provider's other notification kinds use
/// shapes we do not model, and those must still be acknowledged.
#[derive(Debug)]
pub struct Notification {
    kind: Option<String>,
    payment_id: Option<String>,
}

impl Notification {
    pub fn from_value(body: &Value) -> Self {
        let kind = body.get("type").and_then(Value::as_str).map(str::to_string);

        // The provider sends ids as numbers or strings.
        let payment_id = match body.get("data").and_then(|data| data.get("id")) {
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Self { kind, payment_id }
    }

    pub fn is_payment(&self) -> bool {
        self.kind.as_deref() == Some(PAYMENT_NOTIFICATION)
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }
}

/// Acknowledges right away so the provider stops retrying; the payment is
/// reconciled in the background.
pub async fn receive_notification(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode, AppError> {
    let notification = Notification::from_value(&body);
    if !notification.is_payment() {
        debug!(kind = ?notification.kind, "Ignoring non-payment notification");
        return Ok(StatusCode::OK);
    }

    let payment_id = notification
        .payment_id()
        .ok_or_else(|| AppError::ValidationError("Missing payment id".to_string()))?;

    info!(%payment_id, "Payment notification accepted");
    state.reconciler.schedule(payment_id.to_string());

    Ok(StatusCode::OK)
}
