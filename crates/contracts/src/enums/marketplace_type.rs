use serde::{Deserialize, Serialize};

/// Типы маркетплейсов
///
/// Сериализуется кодом маркетплейса (`"ozon"`, `"wildberries"`, `"yandex"`),
/// он же используется как ключ в отчете сверки цен.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketplaceType {
    #[serde(rename = "ozon")]
    Ozon,
    #[serde(rename = "wildberries")]
    Wildberries,
    #[serde(rename = "yandex")]
    YandexMarket,
}

impl MarketplaceType {
    /// Получить код маркетплейса
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "ozon",
            MarketplaceType::Wildberries => "wildberries",
            MarketplaceType::YandexMarket => "yandex",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "Ozon",
            MarketplaceType::Wildberries => "Wildberries",
            MarketplaceType::YandexMarket => "Яндекс Маркет",
        }
    }

    /// Получить все типы маркетплейсов
    pub fn all() -> Vec<MarketplaceType> {
        vec![
            MarketplaceType::Ozon,
            MarketplaceType::Wildberries,
            MarketplaceType::YandexMarket,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "ozon" => Some(MarketplaceType::Ozon),
            "wildberries" | "wb" => Some(MarketplaceType::Wildberries),
            "yandex" | "ym" | "yandex_market" => Some(MarketplaceType::YandexMarket),
            _ => None,
        }
    }
}

impl std::fmt::Display for MarketplaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for mp in MarketplaceType::all() {
            assert_eq!(MarketplaceType::from_code(mp.code()), Some(mp));
        }
        assert_eq!(MarketplaceType::from_code(" WB "), Some(MarketplaceType::Wildberries));
        assert_eq!(MarketplaceType::from_code("kuper"), None);
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&MarketplaceType::YandexMarket).unwrap();
        assert_eq!(json, "\"yandex\"");
    }
}
