use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::enums::marketplace_type::MarketplaceType;

/// Учетные данные одного маркетплейса
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub seller_id: String,
    #[serde(default)]
    pub api_key: String,
}

impl Credentials {
    pub fn new(seller_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            seller_id: seller_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Оба поля заполнены (пробелы не считаются)
    pub fn is_complete(&self) -> bool {
        !self.seller_id.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Набор учетных данных по всем маркетплейсам. Заменяется целиком.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    pub ozon: Credentials,
    pub wildberries: Credentials,
    pub yandex: Credentials,
}

impl CredentialSet {
    pub fn get(&self, marketplace: MarketplaceType) -> &Credentials {
        match marketplace {
            MarketplaceType::Ozon => &self.ozon,
            MarketplaceType::Wildberries => &self.wildberries,
            MarketplaceType::YandexMarket => &self.yandex,
        }
    }

    /// Представление для UI: API ключи наружу не отдаются
    pub fn masked(&self) -> BTreeMap<MarketplaceType, MaskedCredentials> {
        MarketplaceType::all()
            .into_iter()
            .map(|mp| {
                let creds = self.get(mp);
                (
                    mp,
                    MaskedCredentials {
                        seller_id: creds.seller_id.clone(),
                        has_api_key: !creds.api_key.trim().is_empty(),
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskedCredentials {
    pub seller_id: String,
    pub has_api_key: bool,
}

/// Форма настроек в том виде, в котором ее присылает UI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub yandex_seller_id: String,
    pub yandex_api_key: String,
    pub ozon_seller_id: String,
    pub ozon_api_key: String,
    pub wildberries_seller_id: String,
    pub wildberries_api_key: String,
}

impl From<SettingsForm> for CredentialSet {
    fn from(form: SettingsForm) -> Self {
        Self {
            ozon: Credentials::new(form.ozon_seller_id, form.ozon_api_key),
            wildberries: Credentials::new(form.wildberries_seller_id, form.wildberries_api_key),
            yandex: Credentials::new(form.yandex_seller_id, form.yandex_api_key),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSettingsResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_form_defaults_to_empty() {
        let form: SettingsForm =
            serde_json::from_str(r#"{"ozon_seller_id": "123", "ozon_api_key": "key"}"#).unwrap();
        let set = CredentialSet::from(form);
        assert!(set.get(MarketplaceType::Ozon).is_complete());
        assert_eq!(set.wildberries, Credentials::default());
        assert!(!set.get(MarketplaceType::YandexMarket).is_complete());
    }

    #[test]
    fn test_whitespace_is_not_a_credential() {
        assert!(!Credentials::new("  ", "key").is_complete());
        assert!(!Credentials::new("id", "\t").is_complete());
    }

    #[test]
    fn test_masked_hides_api_key() {
        let set = CredentialSet {
            ozon: Credentials::new("42", "secret"),
            ..Default::default()
        };
        let json = serde_json::to_string(&set.masked()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"has_api_key\":true"));
    }
}
