use std::sync::Arc;

use crate::config::Config;
use crate::provider::PaymentProvider;
use crate::reconcile::Reconciler;
use crate::store::TicketStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn TicketStore>,
    pub provider: Arc<dyn PaymentProvider>,
    pub reconciler: Reconciler,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn TicketStore>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        let reconciler = Reconciler::new(
            store.clone(),
            provider.clone(),
            config.mercadopago_access_token.clone(),
            config.retry_policy,
        );

        Self {
            config: Arc::new(config),
            store,
            provider,
            reconciler,
        }
    }
}
