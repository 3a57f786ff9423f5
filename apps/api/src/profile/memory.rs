use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::profile::models::{SavedLocation, UserProfile};
use crate::profile::store::{ProfileStore, ProfileStoreError};

/// In-process profile store for local runs and tests. Lost on restart.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn save_location(
        &self,
        user_id: &str,
        location: &SavedLocation,
    ) -> Result<(), ProfileStoreError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile {
                user_id: user_id.to_string(),
                ..Default::default()
            });
        profile.province = Some(location.province.clone());
        profile.district = Some(location.district.clone());
        profile.subdistrict = Some(location.subdistrict.clone());
        profile.zip_code = location.zip_code.clone();
        profile.updated_at = Some(Utc::now());
        Ok(())
    }
}
