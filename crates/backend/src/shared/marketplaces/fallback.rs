use contracts::domain::a002_marketplace_credentials::aggregate::Credentials;
use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u501_reconcile_prices::{ConnectionProbeResult, ListingSource};
use std::time::Duration;

use super::{DemoGenerator, FetchError, MarketplaceClient};
use crate::domain::a001_recommended_price::PriceTable;
use crate::shared::config::MarketplacesConfig;

/// Параметры одного запуска получения товаров
pub struct FetchContext<'a> {
    pub page_limit: u32,
    /// Верхняя граница на весь запрос к одному маркетплейсу
    pub timeout: Duration,
    pub fallback_count: usize,
    pub preview_mode: bool,
    pub demo: &'a DemoGenerator,
    /// Снимок таблицы цен: демо-товары строятся по ее артикулам
    pub price_table: &'a PriceTable,
}

impl<'a> FetchContext<'a> {
    pub fn from_config(
        config: &MarketplacesConfig,
        demo: &'a DemoGenerator,
        price_table: &'a PriceTable,
    ) -> Self {
        Self {
            page_limit: config.page_limit,
            timeout: config.request_timeout(),
            fallback_count: config.fallback_count,
            preview_mode: config.preview_mode,
            demo,
            price_table,
        }
    }

    fn demo_listings(&self, marketplace: MarketplaceType) -> Vec<Listing> {
        self.demo
            .generate_for_table(marketplace, self.fallback_count.max(1), self.price_table)
    }
}

/// Товары одного маркетплейса и их происхождение
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub marketplace: MarketplaceType,
    pub listings: Vec<Listing>,
    pub source: ListingSource,
}

/// Получить товары маркетплейса; при любой ошибке — демо-данные.
///
/// Не возвращает ошибок и не зависает дольше `ctx.timeout`.
pub async fn fetch_with_fallback(
    client: &dyn MarketplaceClient,
    credentials: &Credentials,
    ctx: &FetchContext<'_>,
) -> FetchOutcome {
    let marketplace = client.marketplace();

    if !credentials.is_complete() {
        if ctx.preview_mode {
            tracing::info!("{}: no credentials, preview mode demo data", marketplace);
            return FetchOutcome {
                marketplace,
                listings: ctx.demo_listings(marketplace),
                source: ListingSource::Fallback,
            };
        }
        tracing::info!("{}: no credentials, skipped", marketplace);
        return FetchOutcome {
            marketplace,
            listings: Vec::new(),
            source: ListingSource::Unconfigured,
        };
    }

    let result = tokio::time::timeout(
        ctx.timeout,
        client.fetch_listings(credentials, ctx.page_limit),
    )
    .await
    .unwrap_or(Err(FetchError::Timeout));

    match result {
        Ok(listings) => FetchOutcome {
            marketplace,
            listings,
            source: ListingSource::Live,
        },
        Err(e) => {
            tracing::warn!("{}: fetch failed, using demo data: {}", marketplace, e);
            FetchOutcome {
                marketplace,
                listings: ctx.demo_listings(marketplace),
                source: ListingSource::Fallback,
            }
        }
    }
}

/// Проверка подключения: сколько товаров сейчас отдает маркетплейс
pub async fn probe_connection(
    client: &dyn MarketplaceClient,
    credentials: &Credentials,
    ctx: &FetchContext<'_>,
) -> ConnectionProbeResult {
    let outcome = fetch_with_fallback(client, credentials, ctx).await;
    ConnectionProbeResult {
        marketplace: outcome.marketplace,
        success: outcome.source == ListingSource::Live,
        count: outcome.listings.len(),
        source: outcome.source,
    }
}
