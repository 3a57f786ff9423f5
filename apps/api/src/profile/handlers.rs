use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::location::selection::SelectionState;
use crate::profile::loader::{LocationSnapshot, ProfileLocationLoader};
use crate::profile::models::SavedLocation;
use crate::state::AppState;

#[derive(Serialize)]
pub struct LocationResponse {
    #[serde(flatten)]
    pub snapshot: LocationSnapshot,
    /// Whether the selection satisfies the province/district/subdistrict chain.
    pub consistent: bool,
}

/// GET /api/v1/users/:user_id/location
/// A failed profile read is reported in `error`, not as an HTTP failure.
pub async fn handle_get_location(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LocationResponse>, AppError> {
    let user_id = require_user_id(&user_id)?;
    let loader = ProfileLocationLoader::new(state.profiles.clone());
    let snapshot = loader.load(Some(user_id), &state.reference).await;
    let consistent = snapshot.selection.validate(&state.reference).is_consistent();

    Ok(Json(LocationResponse {
        snapshot,
        consistent,
    }))
}

/// PUT /api/v1/users/:user_id/location
pub async fn handle_put_location(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(mut selection): Json<SelectionState>,
) -> Result<Json<LocationResponse>, AppError> {
    let user_id = require_user_id(&user_id)?;
    if !selection.is_complete() {
        return Err(AppError::Validation(
            "province, district and subdistrict are all required".to_string(),
        ));
    }

    selection.derive_zip_code(&state.reference);
    let check = selection.validate(&state.reference);
    if !check.is_consistent() {
        return Err(AppError::InconsistentLocation(check));
    }

    let location = SavedLocation {
        province: selection.selected_province.clone(),
        district: selection.selected_amphure.clone(),
        subdistrict: selection.selected_tambon.clone(),
        zip_code: Some(selection.zip_code.clone()).filter(|z| !z.is_empty()),
    };
    state.profiles.save_location(user_id, &location).await?;
    info!("Updated location for user {user_id}");

    Ok(Json(LocationResponse {
        snapshot: LocationSnapshot {
            selection,
            profile_loaded: true,
            error: None,
        },
        consistent: true,
    }))
}

fn require_user_id(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("user id must not be empty".to_string()));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::Validation(format!("'{trimmed}' is not a valid user id")));
    }
    Ok(trimmed)
}
