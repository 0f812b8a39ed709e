use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, SecurityHeaders};
use crate::handlers::{admins, checkout, events, health_check, transactions, webhook};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let cors = create_cors_layer(&state.config.client_url);

    let api = Router::new()
        .route("/auth/:admin_id/public_key", get(admins::public_key))
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route("/events/admin", get(events::admin_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/block", put(events::block_event))
        .route("/events/:id/sales", get(events::event_sales))
        .route(
            "/events/:id/transaction-count",
            get(events::transaction_count),
        )
        .route("/events/:id/manual-sales", post(events::create_manual_sale))
        .route("/transactions/stats", get(transactions::sales_stats))
        .route("/transactions/:id/check-in", put(transactions::check_in))
        .route(
            "/transactions/:id/check-out",
            put(transactions::undo_check_in),
        );

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .route("/verify_transaction/:id", get(transactions::lookup_ticket))
        .route("/create_preference", post(checkout::create_preference))
        .route("/webhook", post(webhook::receive_notification))
        .route("/payment_success", get(checkout::payment_success))
        .route("/payment_failure", get(checkout::payment_failure))
        .route("/payment_pending", get(checkout::payment_pending))
        .with_state(state);

    SecurityHeaders::from_env()
        .apply(router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
