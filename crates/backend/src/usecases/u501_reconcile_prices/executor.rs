use contracts::domain::a002_marketplace_credentials::aggregate::CredentialSet;
use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_reconcile_prices::{
    ComparisonResult, ConnectionProbeResult, ListingSource, ReconcilePrices, Report,
};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::a001_recommended_price::{PriceTable, PriceTableStore};
use crate::domain::a002_marketplace_credentials::CredentialStore;
use crate::shared::config::MarketplacesConfig;
use crate::shared::format::format_price;
use crate::shared::marketplaces::{
    fetch_with_fallback, probe_connection, DemoGenerator, FetchContext, MarketplaceClient,
};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Сначала загрузите данные товаров")]
    NoPriceTable,
}

/// Executor для UseCase сверки цен
pub struct ReconcileExecutor {
    clients: Vec<Arc<dyn MarketplaceClient>>,
    config: MarketplacesConfig,
    demo: DemoGenerator,
}

impl ReconcileExecutor {
    pub fn new(
        clients: Vec<Arc<dyn MarketplaceClient>>,
        config: MarketplacesConfig,
        demo: DemoGenerator,
    ) -> Self {
        Self {
            clients,
            config,
            demo,
        }
    }

    pub fn client(&self, marketplace: MarketplaceType) -> Option<&Arc<dyn MarketplaceClient>> {
        self.clients.iter().find(|c| c.marketplace() == marketplace)
    }

    /// Сверка по текущим данным хранилищ: снимки берутся один раз в начале
    pub async fn run(
        &self,
        prices: &PriceTableStore,
        credentials: &CredentialStore,
    ) -> Result<Report, ReconcileError> {
        self.reconcile(prices.snapshot(), credentials.snapshot())
            .await
    }

    /// Запросить все маркетплейсы параллельно и сопоставить товары с
    /// рекомендованными ценами.
    ///
    /// Ошибка маркетплейса не прерывает сверку: его товары заменяются
    /// демо-данными. Каждый маркетплейс ограничен собственным таймаутом.
    pub async fn reconcile(
        &self,
        price_table: Arc<PriceTable>,
        credentials: Arc<CredentialSet>,
    ) -> Result<Report, ReconcileError> {
        if price_table.is_empty() {
            return Err(ReconcileError::NoPriceTable);
        }

        let run_id = Uuid::new_v4();
        let started_at = std::time::Instant::now();
        tracing::info!(
            "{} {} started: {} articles, {} marketplaces",
            ReconcilePrices::full_name(),
            run_id,
            price_table.len(),
            self.clients.len()
        );

        let ctx = FetchContext::from_config(&self.config, &self.demo, &price_table);
        let outcomes = join_all(self.clients.iter().map(|client| {
            let creds = credentials.get(client.marketplace());
            fetch_with_fallback(client.as_ref(), creds, &ctx)
        }))
        .await;

        let mut report = Report::default();
        for outcome in outcomes {
            let results = compare_listings(outcome.listings, &price_table);
            let low_count = results.iter().filter(|r| r.is_low).count();
            tracing::info!(
                "Reconcile {}: {} -> {} items ({:?}), {} below recommended, max undercut {}",
                run_id,
                outcome.marketplace,
                results.len(),
                outcome.source,
                low_count,
                format_price(max_undercut(&results))
            );
            if outcome.source == ListingSource::Fallback {
                tracing::warn!(
                    "Reconcile {}: {} report contains demo data",
                    run_id,
                    outcome.marketplace
                );
            }
            report.insert(outcome.marketplace, results);
        }

        tracing::info!(
            "Reconcile {} finished: total={}, elapsed_ms={}",
            run_id,
            report.stats.total,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Проверка подключения к одному маркетплейсу
    pub async fn probe(
        &self,
        marketplace: MarketplaceType,
        price_table: Arc<PriceTable>,
        credentials: Arc<CredentialSet>,
    ) -> Option<ConnectionProbeResult> {
        let client = self.client(marketplace)?;
        let ctx = FetchContext::from_config(&self.config, &self.demo, &price_table);
        Some(probe_connection(client.as_ref(), credentials.get(marketplace), &ctx).await)
    }
}

/// Сопоставить товары маркетплейса с таблицей цен, сохраняя порядок
pub fn compare_listings(listings: Vec<Listing>, table: &PriceTable) -> Vec<ComparisonResult> {
    listings
        .into_iter()
        .map(|listing| {
            let recommended = table.get(&listing.article);
            ComparisonResult::from_listing(listing, recommended)
        })
        .collect()
}

/// Наибольшее отставание цены от рекомендованной среди строк с is_low
pub fn max_undercut(results: &[ComparisonResult]) -> f64 {
    results
        .iter()
        .filter(|r| r.is_low)
        .map(|r| r.recommended_price - r.actual_price)
        .fold(0.0, f64::max)
}
