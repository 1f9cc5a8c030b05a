use serde::{Deserialize, Serialize};

/// Рекомендованная цена для артикула из загруженной таблицы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedPriceEntry {
    pub article: String,
    pub recommended_price: f64,
}

/// Результат загрузки файла с рекомендованными ценами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

impl UploadResult {
    pub fn loaded(count: usize) -> Self {
        Self {
            success: true,
            message: format!("Загружено {} товаров", count),
            count,
        }
    }
}
