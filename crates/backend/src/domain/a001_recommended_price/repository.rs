use std::sync::{Arc, RwLock};

use super::service::PriceTable;

/// Хранилище текущей таблицы рекомендованных цен (in-memory).
///
/// Таблица заменяется целиком; сверка работает со снимком, взятым в начале.
#[derive(Clone, Default)]
pub struct PriceTableStore {
    current: Arc<RwLock<Arc<PriceTable>>>,
}

impl PriceTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Снимок текущей таблицы
    pub fn snapshot(&self) -> Arc<PriceTable> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Атомарно заменить таблицу
    pub fn replace(&self, table: PriceTable) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(table);
    }
}
