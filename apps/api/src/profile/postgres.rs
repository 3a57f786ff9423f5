use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::profile::models::{SavedLocation, UserProfile, UserProfileRow};
use crate::profile::store::{ProfileStore, ProfileStoreError};

/// Profile store over the `user_profiles` table.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
        let row: Option<UserProfileRow> =
            sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(UserProfile::from))
    }

    async fn save_location(
        &self,
        user_id: &str,
        location: &SavedLocation,
    ) -> Result<(), ProfileStoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, province, district, subdistrict, zip_code, updated_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (user_id) DO UPDATE
            SET province = EXCLUDED.province,
                district = EXCLUDED.district,
                subdistrict = EXCLUDED.subdistrict,
                zip_code = EXCLUDED.zip_code,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(&location.province)
        .bind(&location.district)
        .bind(&location.subdistrict)
        .bind(location.zip_code.as_deref())
        .execute(&self.pool)
        .await?;

        info!("Saved location for user {user_id}");
        Ok(())
    }
}
