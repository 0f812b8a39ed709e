use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{Payment, PaymentProvider, PreferenceRequest, PreferenceResponse, ProviderError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct MercadoPagoClient {
    http: reqwest::Client,
    base_url: String,
}

impl MercadoPagoClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Status { status, body }
}

#[async_trait]
impl PaymentProvider for MercadoPagoClient {
    async fn get_payment(
        &self,
        access_token: &str,
        payment_id: &str,
    ) -> Result<Option<Payment>, ProviderError> {
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);
        let response = self.http.get(&url).bearer_auth(access_token).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(payment_id, "Payment not found at provider");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(Some(response.json::<Payment>().await?))
    }

    async fn create_preference(
        &self,
        access_token: &str,
        preference: &PreferenceRequest,
    ) -> Result<PreferenceResponse, ProviderError> {
        let url = format!("{}/checkout/preferences", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(preference)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json::<PreferenceResponse>().await?)
    }
}
