use async_trait::async_trait;
use contracts::domain::a002_marketplace_credentials::aggregate::Credentials;
use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{build_http_client, product_url, read_json, FetchError, MarketplaceClient};
use crate::shared::format::round_price;

const DEFAULT_BASE_URL: &str = "https://statistics-api.wildberries.ru";

/// Дата, начиная с которой отчет по остаткам отдает все позиции
const STOCKS_DATE_FROM: &str = "2019-06-20";

/// Клиент для работы с API Wildberries
///
/// Остатки и цены берутся из отчета GET /api/v1/supplier/stocks
/// (по строке на склад). Авторизация — токен в заголовке Authorization,
/// seller_id (ID поставщика) в запрос не передается.
pub struct WildberriesClient {
    client: reqwest::Client,
    base_url: String,
}

impl WildberriesClient {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        })
    }
}

#[async_trait]
impl MarketplaceClient for WildberriesClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Wildberries
    }

    async fn fetch_listings(
        &self,
        credentials: &Credentials,
        page_limit: u32,
    ) -> Result<Vec<Listing>, FetchError> {
        if !credentials.is_complete() {
            return Ok(Vec::new());
        }

        // Очищаем API ключ от невидимых символов и пробелов
        let api_key = credentials.api_key.trim().replace(['\n', '\r', '\t'], "");

        let url = format!("{}/api/v1/supplier/stocks", self.base_url);
        tracing::debug!("GET {} Authorization: ****", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", api_key.as_str())
            .query(&[("dateFrom", STOCKS_DATE_FROM)])
            .send()
            .await?;

        let rows: Vec<WbStockRow> = read_json(MarketplaceType::Wildberries, response).await?;
        let total_rows = rows.len();
        let listings = aggregate_rows(rows, page_limit as usize);

        tracing::info!(
            "Wildberries API: {} stock rows received, {} sellable items",
            total_rows,
            listings.len()
        );
        Ok(listings)
    }
}

/// Свернуть строки по складам в товары (nmId), сохраняя порядок первого
/// появления. В выдачу попадают карточки с ценой и остатком больше нуля,
/// не больше page_limit штук.
fn aggregate_rows(rows: Vec<WbStockRow>, page_limit: usize) -> Vec<Listing> {
    let mut items: Vec<WbStockItem> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.nm_id) {
            Some(&pos) => {
                items[pos].quantity = items[pos].quantity.saturating_add(row.quantity.max(0))
            }
            None => {
                index.insert(row.nm_id, items.len());
                items.push(WbStockItem {
                    quantity: row.quantity.max(0),
                    row,
                });
            }
        }
    }

    items
        .into_iter()
        .filter_map(to_listing)
        .take(page_limit)
        .collect()
}

struct WbStockItem {
    row: WbStockRow,
    quantity: i64,
}

fn to_listing(item: WbStockItem) -> Option<Listing> {
    let row = item.row;
    if item.quantity <= 0 {
        return None;
    }

    let price = row.price_with_discount();
    if !price.is_finite() || price <= 0.0 {
        tracing::warn!(
            "Wildberries nmId {} ({}): no price, skipped",
            row.nm_id,
            row.supplier_article
        );
        return None;
    }

    let sku = row.nm_id.to_string();
    let name = [row.brand.as_deref(), row.subject.as_deref()]
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(Listing {
        url: product_url(MarketplaceType::Wildberries, &sku),
        name: if name.is_empty() {
            row.supplier_article.clone()
        } else {
            name
        },
        article: row.supplier_article.trim().to_string(),
        sku,
        actual_price: round_price(price),
        stock: u32::try_from(item.quantity).unwrap_or(u32::MAX),
    })
}

// ============================================================================
// Response structures для Wildberries Statistics API
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WbStockRow {
    #[serde(rename = "nmId")]
    pub nm_id: i64,
    #[serde(rename = "supplierArticle", default)]
    pub supplier_article: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(rename = "Price", default)]
    pub price: f64,
    /// Скидка продавца в процентах
    #[serde(rename = "Discount", default)]
    pub discount: f64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "warehouseName", default)]
    pub warehouse_name: Option<String>,
}

impl WbStockRow {
    fn price_with_discount(&self) -> f64 {
        let discount = self.discount.clamp(0.0, 100.0);
        self.price * (1.0 - discount / 100.0)
    }
}
