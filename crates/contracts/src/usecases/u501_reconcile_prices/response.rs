use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::a003_listing::aggregate::Listing;
use crate::enums::marketplace_type::MarketplaceType;

/// Строка отчета: товар маркетплейса, сопоставленный с рекомендованной ценой
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub sku: String,
    pub article: String,
    pub name: String,
    pub actual_price: f64,
    /// 0, если артикула нет в таблице рекомендованных цен
    pub recommended_price: f64,
    pub stock: u32,
    pub url: String,
    pub is_low: bool,
}

impl ComparisonResult {
    pub fn from_listing(listing: Listing, recommended_price: Option<f64>) -> Self {
        let recommended_price = recommended_price.unwrap_or(0.0);
        Self {
            is_low: is_low(listing.actual_price, recommended_price),
            sku: listing.sku,
            article: listing.article,
            name: listing.name,
            actual_price: listing.actual_price,
            recommended_price,
            stock: listing.stock,
            url: listing.url,
        }
    }
}

/// Цена ниже рекомендованной. Без рекомендованной цены сравнивать не с чем.
pub fn is_low(actual_price: f64, recommended_price: f64) -> bool {
    recommended_price > 0.0 && actual_price < recommended_price
}

/// Количество строк отчета по маркетплейсам и всего
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    #[serde(flatten)]
    pub per_marketplace: BTreeMap<MarketplaceType, usize>,
    pub total: usize,
}

/// Отчет сверки цен.
///
/// Сериализуется в виде
/// `{"ozon": [...], "wildberries": [...], "yandex": [...], "stats": {"ozon": 2, ..., "total": 5}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub marketplaces: BTreeMap<MarketplaceType, Vec<ComparisonResult>>,
    pub stats: ReportStats,
}

impl Report {
    pub fn results(&self, marketplace: MarketplaceType) -> &[ComparisonResult] {
        self.marketplaces
            .get(&marketplace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Добавить результаты маркетплейса и пересчитать статистику
    pub fn insert(&mut self, marketplace: MarketplaceType, results: Vec<ComparisonResult>) {
        self.marketplaces.insert(marketplace, results);
        self.stats.per_marketplace = self
            .marketplaces
            .iter()
            .map(|(mp, rows)| (*mp, rows.len()))
            .collect();
        self.stats.total = self.stats.per_marketplace.values().sum();
    }
}

/// Откуда взяты товары маркетплейса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    /// Ответ API маркетплейса
    Live,
    /// Учетные данные не заданы, запрос не выполнялся
    Unconfigured,
    /// Демо-данные вместо неудавшегося запроса
    Fallback,
}

/// Результат проверки подключения к маркетплейсу
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProbeResult {
    pub marketplace: MarketplaceType,
    pub success: bool,
    pub count: usize,
    pub source: ListingSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(article: &str, price: f64) -> Listing {
        Listing {
            sku: "1".into(),
            article: article.into(),
            name: "Товар".into(),
            actual_price: price,
            stock: 1,
            url: String::new(),
        }
    }

    #[test]
    fn test_is_low_rule() {
        assert!(is_low(90.0, 100.0));
        assert!(is_low(0.0, 100.0));
        assert!(!is_low(100.0, 100.0));
        assert!(!is_low(120.0, 100.0));
        assert!(!is_low(0.0, 0.0));
        assert!(!is_low(10.0, 0.0));
    }

    #[test]
    fn test_missing_recommendation_is_never_low() {
        let row = ComparisonResult::from_listing(listing("ART3", 10.0), None);
        assert_eq!(row.recommended_price, 0.0);
        assert!(!row.is_low);
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = Report::default();
        report.insert(
            MarketplaceType::Ozon,
            vec![
                ComparisonResult::from_listing(listing("ART1", 90.0), Some(100.0)),
                ComparisonResult::from_listing(listing("ART3", 10.0), None),
            ],
        );
        report.insert(MarketplaceType::YandexMarket, vec![]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ozon"].as_array().unwrap().len(), 2);
        assert_eq!(value["ozon"][0]["is_low"], true);
        assert_eq!(value["ozon"][1]["recommended_price"], 0.0);
        assert_eq!(value["yandex"].as_array().unwrap().len(), 0);
        assert_eq!(value["stats"]["ozon"], 2);
        assert_eq!(value["stats"]["yandex"], 0);
        assert_eq!(value["stats"]["total"], 2);
    }
}
