//! Turns payment notifications into persisted transactions.
//!
//! A notification can arrive before the provider lets us read the payment,
//! and the provider redelivers notifications it considers unacknowledged.
//! The reconciler therefore polls the payment with bounded exponential
//! backoff, and relies on the unique payment id to absorb redeliveries:
//! every notification ends in exactly one terminal [`Outcome`] and at most
//! one insert.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{MetadataType, NewTransaction};
use crate::provider::{Payment, PaymentProvider};
use crate::store::TicketStore;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait before the first lookup.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before lookup number `attempt` (0-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotFound,
    NotApproved { status: String },
    IncompleteMetadata,
    UnknownEvent { event_id: Uuid },
    Duplicate,
    Persisted { transaction_id: Uuid },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::NotFound => "not_found",
            Outcome::NotApproved { .. } => "not_approved",
            Outcome::IncompleteMetadata => "incomplete_metadata",
            Outcome::UnknownEvent { .. } => "unknown_event",
            Outcome::Duplicate => "duplicate",
            Outcome::Persisted { .. } => "persisted",
        }
    }
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn TicketStore>,
    provider: Arc<dyn PaymentProvider>,
    platform_token: String,
    policy: RetryPolicy,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn TicketStore>,
        provider: Arc<dyn PaymentProvider>,
        platform_token: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            platform_token: platform_token.into(),
            policy,
        }
    }

    /// Runs reconciliation detached from the caller. Failures are logged,
    /// never returned: the notification has already been acknowledged.
    pub fn schedule(&self, payment_id: String) -> JoinHandle<()> {
        let reconciler = self.clone();
        let span = info_span!("reconcile", payment_id = %payment_id);

        tokio::spawn(
            async move {
                match reconciler.reconcile(&payment_id).await {
                    Ok(Outcome::Persisted { transaction_id }) => {
                        info!(%transaction_id, outcome = "persisted", "Transaction recorded");
                    }
                    Ok(outcome) => {
                        info!(outcome = outcome.label(), "Notification needs no transaction");
                    }
                    Err(e) => {
                        error!(error = %e, "Reconciliation failed");
                    }
                }
            }
            .instrument(span),
        )
    }

    pub async fn reconcile(&self, payment_id: &str) -> Result<Outcome, AppError> {
        let Some(mut payment) = self.fetch_with_retry(payment_id).await else {
            return Ok(Outcome::NotFound);
        };

        if let Some(seller_token) = self.seller_token(&payment).await? {
            match self.provider.get_payment(&seller_token, payment_id).await {
                Ok(Some(seller_view)) => payment = seller_view,
                Ok(None) => {
                    debug!("Seller credentials do not see the payment, keeping platform view")
                }
                Err(e) => warn!(error = %e, "Seller lookup failed, keeping platform view"),
            }
        }

        if !payment.is_approved() {
            return Ok(Outcome::NotApproved {
                status: payment.status,
            });
        }

        let metadata = payment.metadata();
        let email = metadata.email.filter(|email| !email.trim().is_empty());
        let event_id = metadata
            .event_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id.trim()).ok());
        let (Some(email), Some(event_id)) = (email, event_id) else {
            warn!("Payment metadata lacks buyer email or event reference");
            return Ok(Outcome::IncompleteMetadata);
        };

        if self.store.find_event(event_id).await?.is_none() {
            warn!(%event_id, "Payment references an unknown event");
            return Ok(Outcome::UnknownEvent { event_id });
        }

        if self
            .store
            .find_transaction_by_payment_id(payment_id)
            .await?
            .is_some()
        {
            return Ok(Outcome::Duplicate);
        }

        let sale = NewTransaction {
            event_id,
            payment_id: Some(payment_id.to_string()),
            price: payment.transaction_amount,
            name: metadata.name.unwrap_or_default(),
            last_name: metadata.last_name.unwrap_or_default(),
            email,
            tel: metadata.tel.unwrap_or_default(),
            selected_menus: metadata.selected_menus.unwrap_or_default(),
            metadata_type: MetadataType::Mercadopago,
        };

        Ok(match self.store.insert_transaction(sale).await? {
            Some(transaction) => Outcome::Persisted {
                transaction_id: transaction.id,
            },
            None => Outcome::Duplicate,
        })
    }

    async fn fetch_with_retry(&self, payment_id: &str) -> Option<Payment> {
        for attempt in 0..self.policy.max_attempts {
            tokio::time::sleep(self.policy.delay_before(attempt)).await;

            match self
                .provider
                .get_payment(&self.platform_token, payment_id)
                .await
            {
                Ok(Some(payment)) => return Some(payment),
                Ok(None) => debug!(attempt, "Payment not visible yet"),
                Err(e) => warn!(attempt, error = %e, "Payment lookup failed"),
            }
        }

        None
    }

    /// The owning seller's token, when the payment names a seller whose
    /// credentials differ from the platform's.
    async fn seller_token(&self, payment: &Payment) -> Result<Option<String>, AppError> {
        let Some(seller_id) = payment
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.seller_id.as_deref())
            .and_then(|id| Uuid::parse_str(id.trim()).ok())
        else {
            return Ok(None);
        };

        let Some(seller) = self.store.find_admin(seller_id).await? else {
            return Ok(None);
        };

        Ok(seller
            .seller_access_token()
            .filter(|token| *token != self.platform_token)
            .map(str::to_string))
    }
}
