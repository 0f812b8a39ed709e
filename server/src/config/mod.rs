use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::reconcile::RetryPolicy;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeaders;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/tickets";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROVIDER_API_URL: &str = "https://api.mercadopago.com";
const DEFAULT_CLIENT_URL: &str = "http://127.0.0.1:5173";
const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const DEFAULT_CURRENCY_ID: &str = "ARS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub mercadopago_access_token: String,
    pub mercadopago_api_url: String,
    pub client_url: String,
    pub server_url: String,
    pub currency_id: String,
    pub retry_policy: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| {
            var(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let defaults = RetryPolicy::default();
        let retry_policy = RetryPolicy {
            initial_delay: Duration::from_secs(parse_or(
                var("RECONCILE_INITIAL_DELAY_SECS"),
                "RECONCILE_INITIAL_DELAY_SECS",
                defaults.initial_delay.as_secs(),
            )?),
            max_delay: Duration::from_secs(parse_or(
                var("RECONCILE_MAX_DELAY_SECS"),
                "RECONCILE_MAX_DELAY_SECS",
                defaults.max_delay.as_secs(),
            )?),
            max_attempts: parse_or(
                var("RECONCILE_MAX_ATTEMPTS"),
                "RECONCILE_MAX_ATTEMPTS",
                defaults.max_attempts,
            )?,
        };
        if retry_policy.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "RECONCILE_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            database_url: or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT)?,
            jwt_secret: required("JWT_SECRET")?,
            mercadopago_access_token: required("MERCADOPAGO_ACCESS_TOKEN")?,
            mercadopago_api_url: or_default("MERCADOPAGO_API_URL", DEFAULT_PROVIDER_API_URL),
            client_url: trim_slash(or_default("CLIENT_URL", DEFAULT_CLIENT_URL)),
            server_url: trim_slash(or_default("SERVER_URL", DEFAULT_SERVER_URL)),
            currency_id: or_default("CURRENCY_ID", DEFAULT_CURRENCY_ID),
            retry_policy,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
