use contracts::domain::a003_listing::aggregate::Listing;
use contracts::enums::marketplace_type::MarketplaceType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::product_url;
use crate::domain::a001_recommended_price::PriceTable;
use crate::shared::format::round_price;

/// Генератор демо-товаров.
///
/// Подставляется вместо ответа маркетплейса, когда запрос не удался
/// (или в режиме предпросмотра без учетных данных). Никогда не падает,
/// каждый товар удовлетворяет инварианту Listing: остаток > 0, цена >= 0.
#[derive(Debug, Clone, Default)]
pub struct DemoGenerator {
    seed: Option<u64>,
}

impl DemoGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Детерминированный генератор (для тестов)
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self, marketplace: MarketplaceType) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ marketplace_salt(marketplace)),
            None => StdRng::from_entropy(),
        }
    }

    /// Случайные товары в формате идентификаторов маркетплейса
    pub fn generate(&self, marketplace: MarketplaceType, count: usize) -> Vec<Listing> {
        let mut rng = self.rng(marketplace);
        (0..count)
            .map(|_| {
                let sku = random_sku(&mut rng, marketplace);
                let article = format!("{}-{:05}", article_prefix(marketplace), rng.gen_range(0..100_000));
                Listing {
                    url: product_url(marketplace, &sku),
                    sku,
                    name: format!("Товар {} - {}", article, marketplace.display_name()),
                    article,
                    actual_price: round_price(rng.gen_range(100.0..10_000.0)),
                    stock: rng.gen_range(1..=100),
                }
            })
            .collect()
    }

    /// Демо-товары для артикулов из таблицы рекомендованных цен: цена
    /// отклоняется от рекомендованной на ±30%. Пустая таблица — обычные
    /// случайные товары.
    pub fn generate_for_table(
        &self,
        marketplace: MarketplaceType,
        count: usize,
        table: &PriceTable,
    ) -> Vec<Listing> {
        if table.is_empty() {
            return self.generate(marketplace, count);
        }

        let mut rng = self.rng(marketplace);
        table
            .entries()
            .iter()
            .take(count)
            .map(|entry| {
                let sku = random_sku(&mut rng, marketplace);
                let factor: f64 = rng.gen_range(0.7..1.3);
                Listing {
                    url: product_url(marketplace, &sku),
                    sku,
                    article: entry.article.clone(),
                    name: format!("Товар {} - {}", entry.article, marketplace.display_name()),
                    actual_price: round_price(entry.recommended_price * factor),
                    stock: rng.gen_range(1..=100),
                }
            })
            .collect()
    }
}

fn marketplace_salt(marketplace: MarketplaceType) -> u64 {
    match marketplace {
        MarketplaceType::Ozon => 0x0a,
        MarketplaceType::Wildberries => 0x0b,
        MarketplaceType::YandexMarket => 0x0c,
    }
}

fn article_prefix(marketplace: MarketplaceType) -> &'static str {
    match marketplace {
        MarketplaceType::Ozon => "OZ",
        MarketplaceType::Wildberries => "WB",
        MarketplaceType::YandexMarket => "YM",
    }
}

/// Ozon product_id — 9 цифр, WB nmId — 8, Yandex marketSku — 12
fn random_sku(rng: &mut StdRng, marketplace: MarketplaceType) -> String {
    let sku: u64 = match marketplace {
        MarketplaceType::Ozon => rng.gen_range(100_000_000..1_000_000_000),
        MarketplaceType::Wildberries => rng.gen_range(10_000_000..100_000_000),
        MarketplaceType::YandexMarket => rng.gen_range(100_000_000_000..1_000_000_000_000),
    };
    sku.to_string()
}
