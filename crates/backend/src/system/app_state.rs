use contracts::domain::a002_marketplace_credentials::aggregate::CredentialSet;
use std::sync::Arc;

use crate::domain::a001_recommended_price::PriceTableStore;
use crate::domain::a002_marketplace_credentials::CredentialStore;
use crate::shared::config::Config;
use crate::shared::marketplaces::{build_clients, DemoGenerator};
use crate::usecases::u501_reconcile_prices::ReconcileExecutor;

/// Общее состояние приложения, передаваемое в handlers
#[derive(Clone)]
pub struct AppState {
    pub price_table: PriceTableStore,
    pub credentials: CredentialStore,
    pub executor: Arc<ReconcileExecutor>,
}

impl AppState {
    pub fn new(executor: ReconcileExecutor) -> Self {
        Self {
            price_table: PriceTableStore::new(),
            credentials: CredentialStore::new(CredentialSet::default()),
            executor: Arc::new(executor),
        }
    }

    /// Собрать состояние из конфигурации: HTTP-клиенты всех маркетплейсов
    /// и пустые хранилища
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let clients = build_clients(&config.marketplaces)?;
        tracing::info!(
            "Marketplace clients ready: {}, timeout={}s, preview_mode={}",
            clients.len(),
            config.marketplaces.request_timeout_secs,
            config.marketplaces.preview_mode
        );
        let executor =
            ReconcileExecutor::new(clients, config.marketplaces.clone(), DemoGenerator::new());
        Ok(Self::new(executor))
    }
}
