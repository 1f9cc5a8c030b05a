use axum::extract::State;
use axum::Json;
use contracts::domain::a002_marketplace_credentials::aggregate::{
    CredentialSet, SaveSettingsResponse, SettingsForm,
};

use crate::system::app_state::AppState;

/// POST /api/save_settings
pub async fn save_settings(
    State(state): State<AppState>,
    Json(form): Json<SettingsForm>,
) -> Json<SaveSettingsResponse> {
    state.credentials.replace(CredentialSet::from(form));
    Json(SaveSettingsResponse {
        success: true,
        message: "Настройки сохранены".to_string(),
    })
}
