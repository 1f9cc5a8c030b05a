use contracts::domain::a002_marketplace_credentials::aggregate::CredentialSet;
use std::sync::{Arc, RwLock};

/// Хранилище учетных данных маркетплейсов (in-memory, на время работы процесса).
///
/// Сохранение настроек заменяет набор целиком. Сверка берет снимок в начале
/// и использует его до конца, даже если настройки поменялись параллельно.
#[derive(Clone, Default)]
pub struct CredentialStore {
    current: Arc<RwLock<Arc<CredentialSet>>>,
}

impl CredentialStore {
    pub fn new(initial: CredentialSet) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub fn snapshot(&self) -> Arc<CredentialSet> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn replace(&self, credentials: CredentialSet) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(credentials);
        tracing::info!("Marketplace credentials replaced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a002_marketplace_credentials::aggregate::Credentials;
    use contracts::enums::marketplace_type::MarketplaceType;

    #[test]
    fn test_defaults_are_empty() {
        let store = CredentialStore::default();
        let snapshot = store.snapshot();
        for mp in MarketplaceType::all() {
            assert!(!snapshot.get(mp).is_complete());
        }
    }

    #[test]
    fn test_replace_is_wholesale() {
        let store = CredentialStore::new(CredentialSet {
            ozon: Credentials::new("1", "a"),
            wildberries: Credentials::new("2", "b"),
            ..Default::default()
        });
        store.replace(CredentialSet {
            yandex: Credentials::new("3", "c"),
            ..Default::default()
        });

        let snapshot = store.snapshot();
        assert_eq!(snapshot.ozon, Credentials::default());
        assert_eq!(snapshot.wildberries, Credentials::default());
        assert_eq!(snapshot.yandex, Credentials::new("3", "c"));
    }

    #[test]
    fn test_snapshot_never_tears() {
        let store = CredentialStore::new(CredentialSet {
            ozon: Credentials::new("old-id", "old-key"),
            ..Default::default()
        });

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    store.replace(CredentialSet {
                        ozon: Credentials::new(format!("id-{}", i), format!("key-{}", i)),
                        ..Default::default()
                    });
                }
            })
        };

        for _ in 0..500 {
            let snapshot = store.snapshot();
            let ozon = snapshot.get(MarketplaceType::Ozon);
            let id_suffix = ozon.seller_id.trim_start_matches("id-").trim_start_matches("old-id");
            let key_suffix = ozon.api_key.trim_start_matches("key-").trim_start_matches("old-key");
            assert_eq!(id_suffix, key_suffix);
        }
        writer.join().unwrap();
    }
}
