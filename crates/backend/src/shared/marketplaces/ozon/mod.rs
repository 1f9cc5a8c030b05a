use async_trait::async_trait;
use contracts::domain::a002_marketplace_credentials::aggregate::Credentials;
use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_http_client, product_url, read_json, FetchError, MarketplaceClient};
use crate::shared::format::round_price;

const DEFAULT_BASE_URL: &str = "https://api-seller.ozon.ru";

/// Статус модерации товара, прошедшего проверку
const MODERATE_STATUS_APPROVED: &str = "approved";

/// Клиент для работы с Ozon Seller API
///
/// seller_id — Client-Id, api_key — Api-Key. Товары берутся через
/// POST /v3/product/list (только VISIBLE), детали и цены —
/// POST /v3/product/info/list для тех же product_id.
pub struct OzonClient {
    client: reqwest::Client,
    base_url: String,
}

impl OzonClient {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        })
    }

    async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        credentials: &Credentials,
        path: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {} Client-Id: {} Api-Key: ****", url, credentials.seller_id);

        let response = self
            .client
            .post(&url)
            .header("Client-Id", credentials.seller_id.trim())
            .header("Api-Key", credentials.api_key.trim())
            .json(body)
            .send()
            .await?;

        read_json(MarketplaceType::Ozon, response).await
    }
}

#[async_trait]
impl MarketplaceClient for OzonClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Ozon
    }

    async fn fetch_listings(
        &self,
        credentials: &Credentials,
        page_limit: u32,
    ) -> Result<Vec<Listing>, FetchError> {
        if !credentials.is_complete() {
            return Ok(Vec::new());
        }

        let request = OzonProductListRequest {
            filter: OzonProductListFilter {
                visibility: "VISIBLE".to_string(),
            },
            last_id: String::new(),
            limit: page_limit,
        };
        let list: OzonProductListResponse =
            self.post(credentials, "/v3/product/list", &request).await?;

        let product_ids: Vec<i64> = list.result.items.iter().map(|i| i.product_id).collect();
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let info: OzonProductInfoResponse = self
            .post(
                credentials,
                "/v3/product/info/list",
                &OzonProductInfoRequest {
                    product_id: product_ids,
                },
            )
            .await?;

        let total = info.items.len();
        let listings: Vec<Listing> = info.items.into_iter().filter_map(to_listing).collect();
        tracing::info!(
            "Ozon API: {} products received, {} sellable",
            total,
            listings.len()
        );
        Ok(listings)
    }
}

/// Перевести товар Ozon в единый формат; None для непродаваемых позиций
fn to_listing(item: OzonProductInfo) -> Option<Listing> {
    if item.is_archived || !item.is_approved() {
        return None;
    }

    let stock = item.available_stock();
    if stock == 0 {
        return None;
    }

    let price = match item.price.trim().parse::<f64>() {
        Ok(p) if p.is_finite() && p >= 0.0 => round_price(p),
        _ => {
            tracing::warn!(
                "Ozon product {} ({}): invalid price '{}', skipped",
                item.id,
                item.offer_id,
                item.price
            );
            return None;
        }
    };

    let storefront_sku = item
        .stocks
        .as_ref()
        .and_then(|s| s.stocks.iter().map(|st| st.sku).find(|sku| *sku > 0))
        .unwrap_or(item.id);

    Some(Listing {
        sku: item.id.to_string(),
        article: item.offer_id.trim().to_string(),
        name: item.name,
        actual_price: price,
        stock,
        url: product_url(MarketplaceType::Ozon, &storefront_sku.to_string()),
    })
}

// ============================================================================
// Request/Response structures для Ozon Seller API
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OzonProductListRequest {
    pub filter: OzonProductListFilter,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_id: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonProductListFilter {
    pub visibility: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductListResult {
    pub items: Vec<OzonProductListItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductListItem {
    pub product_id: i64,
    #[serde(default)]
    pub offer_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OzonProductInfoRequest {
    pub product_id: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductInfoResponse {
    // /v3/product/info/list возвращает items напрямую, без обертки result
    pub items: Vec<OzonProductInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub offer_id: String,
    pub price: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub statuses: Option<OzonProductStatuses>,
    #[serde(default)]
    pub stocks: Option<OzonProductStocks>,
}

impl OzonProductInfo {
    fn is_approved(&self) -> bool {
        self.statuses
            .as_ref()
            .and_then(|s| s.moderate_status.as_deref())
            .map_or(false, |s| s == MODERATE_STATUS_APPROVED)
    }

    /// Доступный остаток по всем складам (present - reserved)
    fn available_stock(&self) -> u32 {
        self.stocks
            .as_ref()
            .map(|s| {
                s.stocks
                    .iter()
                    .map(|st| st.present.saturating_sub(st.reserved).max(0))
                    .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                    .fold(0u32, u32::saturating_add)
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductStatuses {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub moderate_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductStocks {
    #[serde(default)]
    pub has_stock: Option<bool>,
    #[serde(default)]
    pub stocks: Vec<OzonStockItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonStockItem {
    #[serde(default)]
    pub present: i64,
    #[serde(default)]
    pub reserved: i64,
    #[serde(default)]
    pub sku: i64,
    #[serde(default)]
    pub source: String,
}
