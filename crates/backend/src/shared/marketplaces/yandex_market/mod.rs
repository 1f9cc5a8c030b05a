use async_trait::async_trait;
use contracts::domain::a002_marketplace_credentials::aggregate::Credentials;
use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use super::{build_http_client, product_url, read_json, FetchError, MarketplaceClient};
use crate::shared::format::round_price;

const DEFAULT_BASE_URL: &str = "https://api.partner.market.yandex.ru";

const CAMPAIGN_STATUS_PUBLISHED: &str = "PUBLISHED";
const STOCK_TYPE_AVAILABLE: &str = "AVAILABLE";

/// Клиент для работы с Yandex Market Partner API
///
/// seller_id — ID бизнес-аккаунта, api_key — Bearer токен.
/// Товары: POST /v2/businesses/{businessId}/offer-mappings (без архивных),
/// остатки: POST /v2/campaigns/{campaignId}/offers/stocks для магазинов,
/// в которых товар опубликован.
pub struct YandexMarketClient {
    client: reqwest::Client,
    base_url: String,
}

impl YandexMarketClient {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        })
    }

    async fn fetch_offer_mappings(
        &self,
        credentials: &Credentials,
        page_limit: u32,
    ) -> Result<Vec<YandexOfferMappingEntry>, FetchError> {
        let url = format!(
            "{}/v2/businesses/{}/offer-mappings",
            self.base_url,
            credentials.seller_id.trim()
        );
        tracing::debug!("POST {} Authorization: Bearer ****, limit={}", url, page_limit);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credentials.api_key.trim())
            .query(&[("limit", page_limit)])
            .json(&YandexOfferMappingsRequest { archived: false })
            .send()
            .await?;

        let data: YandexOfferMappingsResponse =
            read_json(MarketplaceType::YandexMarket, response).await?;
        Ok(data.result.offer_mappings)
    }

    /// Доступные остатки по offerId в одном магазине (кампании)
    async fn fetch_stocks(
        &self,
        credentials: &Credentials,
        campaign_id: i64,
        offer_ids: Vec<String>,
    ) -> Result<HashMap<String, u32>, FetchError> {
        let url = format!("{}/v2/campaigns/{}/offers/stocks", self.base_url, campaign_id);
        let limit = offer_ids.len();
        tracing::debug!("POST {} offers={}", url, limit);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credentials.api_key.trim())
            .query(&[("limit", limit)])
            .json(&YandexStocksRequest { offer_ids })
            .send()
            .await?;

        let data: YandexStocksResponse = read_json(MarketplaceType::YandexMarket, response).await?;

        let mut stocks: HashMap<String, u32> = HashMap::new();
        for warehouse in data.result.warehouses {
            for offer in warehouse.offers {
                let available: i64 = offer
                    .stocks
                    .iter()
                    .filter(|s| s.stock_type == STOCK_TYPE_AVAILABLE)
                    .map(|s| s.count.max(0))
                    .sum();
                let entry = stocks.entry(offer.offer_id).or_insert(0);
                *entry = entry.saturating_add(u32::try_from(available).unwrap_or(u32::MAX));
            }
        }
        Ok(stocks)
    }
}

#[async_trait]
impl MarketplaceClient for YandexMarketClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::YandexMarket
    }

    async fn fetch_listings(
        &self,
        credentials: &Credentials,
        page_limit: u32,
    ) -> Result<Vec<Listing>, FetchError> {
        if !credentials.is_complete() {
            return Ok(Vec::new());
        }

        let entries = self.fetch_offer_mappings(credentials, page_limit).await?;
        let total = entries.len();

        let published: Vec<YandexOfferMappingEntry> = entries
            .into_iter()
            .filter(|e| !e.offer.published_campaigns().is_empty())
            .collect();

        // Остатки запрашиваем по каждому магазину, где есть опубликованные товары
        let campaigns: BTreeSet<i64> = published
            .iter()
            .flat_map(|e| e.offer.published_campaigns())
            .collect();

        let mut stocks: HashMap<String, u32> = HashMap::new();
        for campaign_id in campaigns {
            let offer_ids: Vec<String> = published
                .iter()
                .filter(|e| e.offer.published_campaigns().contains(&campaign_id))
                .map(|e| e.offer.offer_id.clone())
                .collect();
            for (offer_id, count) in self.fetch_stocks(credentials, campaign_id, offer_ids).await? {
                let entry = stocks.entry(offer_id).or_insert(0);
                *entry = entry.saturating_add(count);
            }
        }

        let listings: Vec<Listing> = published
            .into_iter()
            .filter_map(|entry| {
                let stock = stocks.get(&entry.offer.offer_id).copied().unwrap_or(0);
                to_listing(entry, stock)
            })
            .collect();

        tracing::info!(
            "Yandex Market API: {} offers received, {} sellable",
            total,
            listings.len()
        );
        Ok(listings)
    }
}

fn to_listing(entry: YandexOfferMappingEntry, stock: u32) -> Option<Listing> {
    if stock == 0 {
        return None;
    }

    let offer = entry.offer;
    let price = match offer.basic_price.as_ref().map(|p| p.value) {
        Some(p) if p.is_finite() && p >= 0.0 => round_price(p),
        _ => {
            tracing::warn!("Yandex Market offer {}: no basic price, skipped", offer.offer_id);
            return None;
        }
    };

    let market_sku = entry.mapping.as_ref().and_then(|m| m.market_sku);
    let sku = market_sku
        .map(|s| s.to_string())
        .unwrap_or_else(|| offer.offer_id.clone());
    let name = offer
        .name
        .clone()
        .or_else(|| entry.mapping.as_ref().and_then(|m| m.market_sku_name.clone()))
        .unwrap_or_else(|| offer.offer_id.clone());

    Some(Listing {
        url: product_url(MarketplaceType::YandexMarket, &sku),
        sku,
        article: offer.offer_id.trim().to_string(),
        name,
        actual_price: price,
        stock,
    })
}

// ============================================================================
// Request/Response structures для Yandex Market API
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct YandexOfferMappingsRequest {
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexOfferMappingsResponse {
    pub result: YandexOfferMappingsResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexOfferMappingsResult {
    #[serde(rename = "offerMappings")]
    pub offer_mappings: Vec<YandexOfferMappingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexOfferMappingEntry {
    pub offer: YandexOffer,
    #[serde(default)]
    pub mapping: Option<YandexMapping>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexOffer {
    #[serde(rename = "offerId")]
    pub offer_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "basicPrice", default)]
    pub basic_price: Option<YandexPrice>,
    #[serde(default)]
    pub campaigns: Vec<YandexOfferCampaign>,
}

impl YandexOffer {
    fn published_campaigns(&self) -> Vec<i64> {
        self.campaigns
            .iter()
            .filter(|c| c.status == CAMPAIGN_STATUS_PUBLISHED)
            .map(|c| c.campaign_id)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexOfferCampaign {
    #[serde(rename = "campaignId")]
    pub campaign_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexMapping {
    #[serde(rename = "marketSku", default)]
    pub market_sku: Option<i64>,
    #[serde(rename = "marketSkuName", default)]
    pub market_sku_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexPrice {
    pub value: f64,
    #[serde(rename = "currencyId", default)]
    pub currency_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YandexStocksRequest {
    #[serde(rename = "offerIds")]
    pub offer_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexStocksResponse {
    pub result: YandexStocksResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexStocksResult {
    #[serde(default)]
    pub warehouses: Vec<YandexWarehouseStocks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexWarehouseStocks {
    #[serde(default)]
    pub offers: Vec<YandexOfferStocks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexOfferStocks {
    #[serde(rename = "offerId")]
    pub offer_id: String,
    #[serde(default)]
    pub stocks: Vec<YandexStock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexStock {
    #[serde(rename = "type")]
    pub stock_type: String,
    #[serde(default)]
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn entry(offer_id: &str, price: f64, status: &str, market_sku: i64) -> serde_json::Value {
        json!({
            "offer": {
                "offerId": offer_id,
                "name": format!("Товар {}", offer_id),
                "basicPrice": { "value": price, "currencyId": "RUR" },
                "campaigns": [{ "campaignId": 55, "status": status }]
            },
            "mapping": { "marketSku": market_sku, "marketSkuName": "SKU name" }
        })
    }

    #[tokio::test]
    async fn test_fetch_published_offers_with_stock() {
        let server = MockServer::start_async().await;
        let mappings_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/businesses/9000/offer-mappings")
                    .query_param("limit", "100")
                    .header("Authorization", "Bearer ym-token")
                    .json_body(json!({ "archived": false }));
                then.status(200).json_body(json!({
                    "status": "OK",
                    "result": {
                        "offerMappings": [
                            entry("ART1", 90.0, "PUBLISHED", 101),
                            entry("ART2", 50.0, "CHECKING", 102),
                            entry("ART3", 10.0, "PUBLISHED", 103)
                        ],
                        "paging": {}
                    }
                }));
            })
            .await;
        let stocks_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/campaigns/55/offers/stocks")
                    .json_body(json!({ "offerIds": ["ART1", "ART3"] }));
                then.status(200).json_body(json!({
                    "status": "OK",
                    "result": {
                        "warehouses": [{
                            "warehouseId": 1,
                            "offers": [
                                { "offerId": "ART1", "stocks": [
                                    { "type": "AVAILABLE", "count": 4 },
                                    { "type": "FIT", "count": 9 }
                                ]},
                                { "offerId": "ART3", "stocks": [{ "type": "AVAILABLE", "count": 0 }] }
                            ]
                        }]
                    }
                }));
            })
            .await;

        let client =
            YandexMarketClient::new(Some(&server.base_url()), Duration::from_secs(5)).unwrap();
        let listings = client
            .fetch_listings(&Credentials::new("9000", "ym-token"), 100)
            .await
            .unwrap();

        mappings_mock.assert_async().await;
        stocks_mock.assert_async().await;
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].sku, "101");
        assert_eq!(listings[0].article, "ART1");
        assert_eq!(listings[0].stock, 4);
        assert_eq!(listings[0].actual_price, 90.0);
        assert_eq!(listings[0].url, "https://market.yandex.ru/product/101");
    }

    #[tokio::test]
    async fn test_nothing_published_skips_stock_request() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/businesses/9000/offer-mappings");
                then.status(200).json_body(json!({
                    "result": { "offerMappings": [entry("ART2", 50.0, "DISABLED_BY_PARTNER", 102)] }
                }));
            })
            .await;
        let stocks_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/campaigns/55/offers/stocks");
                then.status(200).json_body(json!({ "result": { "warehouses": [] } }));
            })
            .await;

        let client =
            YandexMarketClient::new(Some(&server.base_url()), Duration::from_secs(5)).unwrap();
        let listings = client
            .fetch_listings(&Credentials::new("9000", "ym-token"), 100)
            .await
            .unwrap();

        assert!(listings.is_empty());
        stocks_mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_html_error_page_is_payload_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/businesses/9000/offer-mappings");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let client =
            YandexMarketClient::new(Some(&server.base_url()), Duration::from_secs(5)).unwrap();
        let err = client
            .fetch_listings(&Credentials::new("9000", "ym-token"), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Payload(_)));
    }

    #[test]
    fn test_offer_without_mapping_uses_offer_id() {
        let value = json!({
            "offer": {
                "offerId": "ART9",
                "basicPrice": { "value": 12.346 },
                "campaigns": [{ "campaignId": 1, "status": "PUBLISHED" }]
            }
        });
        let entry: YandexOfferMappingEntry = serde_json::from_value(value).unwrap();
        let listing = to_listing(entry, 2).unwrap();
        assert_eq!(listing.sku, "ART9");
        assert_eq!(listing.name, "ART9");
        assert_eq!(listing.actual_price, 12.35);
    }
}
