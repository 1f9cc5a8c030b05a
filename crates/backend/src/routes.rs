use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::system::app_state::AppState;

/// Максимальный размер загружаемого файла с ценами
const UPLOAD_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // RECOMMENDED PRICES
        // ========================================
        .route(
            "/api/upload",
            post(handlers::a001_recommended_price::upload)
                .layer(axum::extract::DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/api/get_data",
            get(handlers::a001_recommended_price::get_data),
        )
        // ========================================
        // MARKETPLACE CREDENTIALS
        // ========================================
        .route(
            "/api/save_settings",
            post(handlers::a002_marketplace_credentials::save_settings),
        )
        // ========================================
        // PRICE RECONCILIATION
        // ========================================
        .route(
            "/api/update_prices",
            post(handlers::u501_reconcile_prices::update_prices),
        )
        .route(
            "/api/test_connection/:marketplace",
            get(handlers::u501_reconcile_prices::test_connection),
        )
        .with_state(state)
}
