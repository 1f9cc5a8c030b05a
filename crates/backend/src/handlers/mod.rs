pub mod a001_recommended_price;
pub mod a002_marketplace_credentials;
pub mod u501_reconcile_prices;

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

/// Ошибка handler'а: статус и тело `{"error": "..."}`
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, message: impl ToString) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}
