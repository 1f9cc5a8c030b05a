use serde::{Deserialize, Serialize};

/// Товар, выставленный на маркетплейсе, в едином для всех площадок виде.
///
/// Клиент маркетплейса возвращает только продаваемые позиции
/// (опубликованные, с остатком больше нуля).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Внутренний идентификатор маркетплейса (для ссылок, не для сопоставления)
    pub sku: String,
    /// Артикул продавца, по нему идет сопоставление с рекомендованными ценами
    pub article: String,
    pub name: String,
    pub actual_price: f64,
    pub stock: u32,
    pub url: String,
}

impl Listing {
    pub fn is_sellable(&self) -> bool {
        self.stock > 0 && self.actual_price >= 0.0 && self.actual_price.is_finite()
    }
}
