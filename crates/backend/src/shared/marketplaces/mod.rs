pub mod demo;
pub mod fallback;
pub mod ozon;
pub mod wildberries;
pub mod yandex_market;

use async_trait::async_trait;
use contracts::domain::a002_marketplace_credentials::aggregate::Credentials;
use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::shared::config::MarketplacesConfig;

pub use demo::DemoGenerator;
pub use fallback::{fetch_with_fallback, probe_connection, FetchContext, FetchOutcome};

/// Ошибка получения товаров с маркетплейса.
///
/// Наружу клиента не выходит: вызывающий код подставляет демо-данные.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Payload(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Трейт для клиента маркетплейса
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    fn marketplace(&self) -> MarketplaceType;

    /// Получить одну страницу продаваемых товаров продавца.
    ///
    /// Пустые учетные данные — не ошибка: возвращается пустой список без
    /// обращения к сети.
    async fn fetch_listings(
        &self,
        credentials: &Credentials,
        page_limit: u32,
    ) -> Result<Vec<Listing>, FetchError>;
}

/// HTTP клиент с ограничением времени на каждый запрос
pub fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Клиенты всех поддерживаемых маркетплейсов по настройкам
pub fn build_clients(config: &MarketplacesConfig) -> anyhow::Result<Vec<Arc<dyn MarketplaceClient>>> {
    let timeout = config.request_timeout();
    let clients: Vec<Arc<dyn MarketplaceClient>> = vec![
        Arc::new(ozon::OzonClient::new(
            config.base_url(MarketplaceType::Ozon),
            timeout,
        )?),
        Arc::new(wildberries::WildberriesClient::new(
            config.base_url(MarketplaceType::Wildberries),
            timeout,
        )?),
        Arc::new(yandex_market::YandexMarketClient::new(
            config.base_url(MarketplaceType::YandexMarket),
            timeout,
        )?),
    ];
    Ok(clients)
}

/// Ссылка на карточку товара на витрине маркетплейса
pub fn product_url(marketplace: MarketplaceType, sku: &str) -> String {
    match marketplace {
        MarketplaceType::Ozon => format!("https://www.ozon.ru/product/{}/", sku),
        MarketplaceType::Wildberries => {
            format!("https://www.wildberries.ru/catalog/{}/detail.aspx", sku)
        }
        MarketplaceType::YandexMarket => format!("https://market.yandex.ru/product/{}", sku),
    }
}

/// Проверить статус ответа и разобрать JSON тело
pub(crate) async fn read_json<T: DeserializeOwned>(
    marketplace: MarketplaceType,
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            "{} API request failed with status {}: {}",
            marketplace.display_name(),
            status,
            body
        );
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;

    let preview: String = body.chars().take(500).collect::<String>();
    let preview = if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    };
    tracing::debug!("{} API response preview: {}", marketplace.display_name(), preview);

    serde_json::from_str::<T>(&body).map_err(|e| {
        tracing::error!(
            "Failed to parse {} API response. Error: {}",
            marketplace.display_name(),
            e
        );
        FetchError::Payload(format!("{}. Response: {}", e, preview))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Клиент-заглушка с заранее заданным ответом
    pub struct StubClient {
        pub marketplace: MarketplaceType,
        pub response: fn() -> Result<Vec<Listing>, FetchError>,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl StubClient {
        pub fn new(
            marketplace: MarketplaceType,
            response: fn() -> Result<Vec<Listing>, FetchError>,
        ) -> Self {
            Self {
                marketplace,
                response,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketplaceClient for StubClient {
        fn marketplace(&self) -> MarketplaceType {
            self.marketplace
        }

        async fn fetch_listings(
            &self,
            credentials: &Credentials,
            _page_limit: u32,
        ) -> Result<Vec<Listing>, FetchError> {
            if !credentials.is_complete() {
                return Ok(Vec::new());
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response)()
        }
    }

    pub fn listing(sku: &str, article: &str, price: f64, stock: u32) -> Listing {
        Listing {
            sku: sku.to_string(),
            article: article.to_string(),
            name: format!("Товар {}", article),
            actual_price: price,
            stock,
            url: format!("https://example.test/{}", sku),
        }
    }
}
