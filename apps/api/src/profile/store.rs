use async_trait::async_trait;
use thiserror::Error;

use crate::profile::models::{SavedLocation, UserProfile};

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed profile document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid document store URL: {0}")]
    InvalidUrl(String),

    #[error("profile fetch task failed: {0}")]
    TaskFailed(String),
}

/// Remote store holding user profiles, keyed by user id.
///
/// Carried in `AppState` as `Arc<dyn ProfileStore>` so the loader never
/// reaches for a global client and tests can swap in a fake.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no profile exists for `user_id`.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileStoreError>;

    /// Writes the four address fields, creating the profile if needed.
    async fn save_location(
        &self,
        user_id: &str,
        location: &SavedLocation,
    ) -> Result<(), ProfileStoreError>;
}
