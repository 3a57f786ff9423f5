use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::location::models::{Amphure, Province, Tambon};
use crate::state::AppState;

// Missing parameters deserialize as "", which resolves to an empty result.

#[derive(Deserialize)]
pub struct ProvinceQuery {
    #[serde(default)]
    pub province: String,
}

#[derive(Deserialize)]
pub struct AmphureQuery {
    #[serde(default)]
    pub amphure: String,
    /// Narrows the district lookup to one province when given.
    pub province: Option<String>,
}

#[derive(Deserialize)]
pub struct ZipCodeQuery {
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub amphure: String,
    #[serde(default)]
    pub tambon: String,
}

#[derive(Serialize)]
pub struct ZipCodeResponse {
    pub zip_code: String,
}

/// GET /api/v1/locations/provinces
pub async fn handle_list_provinces(State(state): State<AppState>) -> Json<Vec<Province>> {
    Json(state.reference.provinces.clone())
}

/// GET /api/v1/locations/amphures?province=
pub async fn handle_list_amphures(
    State(state): State<AppState>,
    Query(params): Query<ProvinceQuery>,
) -> Json<Vec<Amphure>> {
    let amphures = state
        .reference
        .amphures_of(&params.province)
        .into_iter()
        .cloned()
        .collect();
    Json(amphures)
}

/// GET /api/v1/locations/tambons?amphure=[&province=]
pub async fn handle_list_tambons(
    State(state): State<AppState>,
    Query(params): Query<AmphureQuery>,
) -> Json<Vec<Tambon>> {
    let tambons = match params.province.as_deref() {
        Some(province) => state.reference.tambons_in(province, &params.amphure),
        None => state.reference.tambons_of(&params.amphure),
    };
    Json(tambons.into_iter().cloned().collect())
}

/// GET /api/v1/locations/zip-code?province=&amphure=&tambon=
/// An unresolvable triple yields an empty zip code, not an error.
pub async fn handle_zip_code(
    State(state): State<AppState>,
    Query(params): Query<ZipCodeQuery>,
) -> Json<ZipCodeResponse> {
    Json(ZipCodeResponse {
        zip_code: state
            .reference
            .resolve_zip_code(&params.province, &params.amphure, &params.tambon),
    })
}
