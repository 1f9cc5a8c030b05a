use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u501_reconcile_prices::{ConnectionProbeResult, Report};

use super::{api_error, ApiError};
use crate::system::app_state::AppState;

/// POST /api/update_prices
pub async fn update_prices(State(state): State<AppState>) -> Result<Json<Report>, ApiError> {
    match state
        .executor
        .run(&state.price_table, &state.credentials)
        .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e)),
    }
}

/// GET /api/test_connection/:marketplace
pub async fn test_connection(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ConnectionProbeResult>, ApiError> {
    let Some(marketplace) = MarketplaceType::from_code(&code) else {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Неизвестный маркетплейс: {}", code),
        ));
    };

    state
        .executor
        .probe(
            marketplace,
            state.price_table.snapshot(),
            state.credentials.snapshot(),
        )
        .await
        .map(Json)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("Клиент не настроен: {}", marketplace),
            )
        })
}
