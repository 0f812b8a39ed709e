use axum::http::{header, HeaderValue, Method};
use std::env;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// The ticket storefront is the only browser client, so its url is the
/// default allowed origin. `CORS_ALLOWED_ORIGINS` widens the list.
pub fn create_cors_layer(client_url: &str) -> CorsLayer {
    let configured = env::var("CORS_ALLOWED_ORIGINS").ok();
    let allowed_origins = parse_allowed_origins(configured.as_deref().unwrap_or(client_url));

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn parse_allowed_origins(list: &str) -> AllowOrigin {
    let mut origins = Vec::new();
    for origin in list.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        match HeaderValue::from_str(origin) {
            Ok(value) => origins.push(value),
            Err(e) => warn!(%origin, error = %e, "Skipping invalid CORS origin"),
        }
    }

    if origins.is_empty() {
        // Credentials rule out a wildcard.
        warn!("No valid CORS origin configured, mirroring the request origin");
        return AllowOrigin::mirror_request();
    }

    info!(count = origins.len(), "CORS origins configured");
    AllowOrigin::list(origins)
}
