//! Fixtures shared by the unit test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::auth::issue_token;
use crate::config::Config;
use crate::models::{Admin, Event, EventStatus, MenuMoment, SelectedMenus};
use crate::provider::{
    Payment, PaymentMetadata, PaymentProvider, PreferenceRequest, PreferenceResponse,
    ProviderError,
};
use crate::reconcile::RetryPolicy;
use crate::state::AppState;
use crate::store::memory::MemoryStore;

pub const PLATFORM_TOKEN: &str = "APP_USR-platform";
pub const JWT_SECRET: &str = "test-secret";

#[derive(Default)]
struct Script {
    payments: HashMap<(String, String), Payment>,
    hidden: HashMap<String, u32>,
    failing: HashMap<String, u32>,
    lookups: Vec<(String, String)>,
    preferences: Vec<(String, PreferenceRequest)>,
}

/// Provider double with scripted payments keyed by (access token, payment id).
#[derive(Default)]
pub struct FakeProvider {
    script: Mutex<Script>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_payment(&self, access_token: &str, payment_id: &str, payment: Payment) {
        self.script
            .lock()
            .unwrap()
            .payments
            .insert((access_token.to_string(), payment_id.to_string()), payment);
    }

    /// The next `lookups` queries for `payment_id` answer "not found".
    pub fn hide_for(&self, payment_id: &str, lookups: u32) {
        self.script
            .lock()
            .unwrap()
            .hidden
            .insert(payment_id.to_string(), lookups);
    }

    /// The next `lookups` queries for `payment_id` fail.
    pub fn fail_for(&self, payment_id: &str, lookups: u32) {
        self.script
            .lock()
            .unwrap()
            .failing
            .insert(payment_id.to_string(), lookups);
    }

    pub fn lookups(&self, payment_id: &str) -> usize {
        let script = self.script.lock().unwrap();
        script.lookups.iter().filter(|(_, id)| id == payment_id).count()
    }

    pub fn lookups_with(&self, access_token: &str) -> usize {
        let script = self.script.lock().unwrap();
        script
            .lookups
            .iter()
            .filter(|(token, _)| token == access_token)
            .count()
    }

    pub fn preferences(&self) -> Vec<(String, PreferenceRequest)> {
        self.script.lock().unwrap().preferences.clone()
    }
}

fn take_one(counter: &mut HashMap<String, u32>, payment_id: &str) -> bool {
    match counter.get_mut(payment_id) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn get_payment(
        &self,
        access_token: &str,
        payment_id: &str,
    ) -> Result<Option<Payment>, ProviderError> {
        let mut script = self.script.lock().unwrap();
        script
            .lookups
            .push((access_token.to_string(), payment_id.to_string()));

        if take_one(&mut script.failing, payment_id) {
            return Err(ProviderError::Status {
                status: 500,
                body: "internal_error".to_string(),
            });
        }
        if take_one(&mut script.hidden, payment_id) {
            return Ok(None);
        }

        Ok(script
            .payments
            .get(&(access_token.to_string(), payment_id.to_string()))
            .cloned())
    }

    async fn create_preference(
        &self,
        access_token: &str,
        preference: &PreferenceRequest,
    ) -> Result<PreferenceResponse, ProviderError> {
        let mut script = self.script.lock().unwrap();
        script
            .preferences
            .push((access_token.to_string(), preference.clone()));
        let id = format!("pref-{}", script.preferences.len());

        Ok(PreferenceResponse {
            init_point: Some(format!("https://checkout.example/{id}")),
            id,
        })
    }
}

pub fn admin(access_token: &str) -> Admin {
    Admin {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        mercadopago_access_token: access_token.to_string(),
        mercadopago_public_key: "APP_USR-public".to_string(),
        phone: None,
    }
}

pub fn on_sale_event(created_by: Uuid) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        name: "Noche de jazz".to_string(),
        location: "Teatro Colón".to_string(),
        description: "Jazz night with dinner".to_string(),
        price: Decimal::new(2500, 0),
        capacity: 2,
        start_date: now + ChronoDuration::days(10),
        end_purchase_date: now + ChronoDuration::days(9),
        has_menu: true,
        menu_moments: Json(vec![MenuMoment {
            date_time: now + ChronoDuration::days(10),
            menu_options: vec!["veggie".to_string(), "classic".to_string()],
        }]),
        cover_image: None,
        status: EventStatus::Active,
        created_by,
        created_at: now,
        updated_at: now,
    }
}

pub fn approved_payment(event_id: Uuid, amount: Decimal) -> Payment {
    Payment {
        status: "approved".to_string(),
        transaction_amount: amount,
        metadata: Some(PaymentMetadata {
            event_id: Some(event_id.to_string()),
            name: Some("Ana".to_string()),
            last_name: Some("García".to_string()),
            email: Some("buyer@example.com".to_string()),
            tel: Some("+54 11 5555-0000".to_string()),
            selected_menus: Some(SelectedMenus::from([(
                "0".to_string(),
                "veggie".to_string(),
            )])),
            ..PaymentMetadata::default()
        }),
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/tickets_test".to_string(),
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        mercadopago_access_token: PLATFORM_TOKEN.to_string(),
        mercadopago_api_url: "http://provider.invalid".to_string(),
        client_url: "http://client.test".to_string(),
        server_url: "http://server.test".to_string(),
        currency_id: "ARS".to_string(),
        retry_policy: RetryPolicy {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts: 3,
        },
    }
}

pub fn test_state(store: Arc<MemoryStore>, provider: Arc<FakeProvider>) -> AppState {
    AppState::new(test_config(), store, provider)
}

pub fn bearer(admin_id: Uuid) -> String {
    format!("Bearer {}", issue_token(admin_id, JWT_SECRET).unwrap())
}
