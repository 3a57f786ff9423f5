pub mod health;

use axum::{
    routing::get,
    Router,
};

use crate::location::handlers as location;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Reference tables and cascading filters
        .route(
            "/api/v1/locations/provinces",
            get(location::handle_list_provinces),
        )
        .route(
            "/api/v1/locations/amphures",
            get(location::handle_list_amphures),
        )
        .route(
            "/api/v1/locations/tambons",
            get(location::handle_list_tambons),
        )
        .route("/api/v1/locations/zip-code", get(location::handle_zip_code))
        // Per-user saved location
        .route(
            "/api/v1/users/:user_id/location",
            get(profile::handle_get_location).put(profile::handle_put_location),
        )
        .with_state(state)
}
