use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_recommended_price::aggregate::UploadResult;
use serde_json::json;

use super::{api_error, ApiError};
use crate::domain::a001_recommended_price::xlsx_import::{self, ImportError};
use crate::domain::a001_recommended_price::PriceTable;
use crate::system::app_state::AppState;

/// POST /api/upload
///
/// Multipart-форма с полем `file`. Таблица заменяется только при успешном
/// чтении файла.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResult>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Файл не найден"));
    };
    if file_name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Файл не выбран"));
    }

    match import_file(&state, file_name, bytes).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::warn!("Price table upload rejected: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, e))
        }
    }
}

/// Прочитать файл и заменить таблицу цен
pub async fn import_file(
    state: &AppState,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<UploadResult, ImportError> {
    let size = bytes.len();
    let rows = tokio::task::spawn_blocking(move || xlsx_import::read_rows(&file_name, bytes))
        .await
        .map_err(|e| ImportError::Parse(e.to_string()))??;

    let outcome = PriceTable::load(rows);
    tracing::info!(
        "Price table uploaded: {} bytes, loaded={}, skipped={}",
        size,
        outcome.loaded,
        outcome.skipped
    );
    state.price_table.replace(outcome.table);
    Ok(UploadResult::loaded(outcome.loaded))
}

/// GET /api/get_data
///
/// Загруженные товары и настройки без API-ключей
pub async fn get_data(State(state): State<AppState>) -> Json<serde_json::Value> {
    let table = state.price_table.snapshot();
    let credentials = state.credentials.snapshot();
    Json(json!({
        "products": table.entries(),
        "settings": credentials.masked(),
    }))
}
