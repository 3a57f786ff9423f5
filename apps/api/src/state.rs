use std::sync::Arc;

use crate::config::Config;
use crate::location::ReferenceData;
use crate::profile::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup and never mutated.
    pub reference: Arc<ReferenceData>,
    /// Pluggable profile backend. Chosen by PROFILE_STORE.
    pub profiles: Arc<dyn ProfileStore>,
    pub config: Arc<Config>,
}
