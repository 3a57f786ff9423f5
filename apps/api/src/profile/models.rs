use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Worker,
    Employer,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "worker" => Some(UserRole::Worker),
            "employer" => Some(UserRole::Employer),
            _ => None,
        }
    }
}

/// A user's profile record as held by the remote store.
/// Only the four address fields matter to the location selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub subdistrict: Option<String>,
    pub zip_code: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The address part of a profile, present only when province, district
/// and subdistrict are all filled in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedLocation {
    pub province: String,
    pub district: String,
    pub subdistrict: String,
    pub zip_code: Option<String>,
}

impl UserProfile {
    pub fn saved_location(&self) -> Option<SavedLocation> {
        let province = non_empty(&self.province)?;
        let district = non_empty(&self.district)?;
        let subdistrict = non_empty(&self.subdistrict)?;
        Some(SavedLocation {
            province,
            district,
            subdistrict,
            zip_code: non_empty(&self.zip_code),
        })
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub user_id: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub subdistrict: Option<String>,
    pub zip_code: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            display_name: row.display_name,
            phone: row.phone,
            role: row.role.as_deref().and_then(UserRole::parse),
            province: row.province,
            district: row.district,
            subdistrict: row.subdistrict,
            zip_code: row.zip_code,
            updated_at: Some(row.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_location_requires_all_three_levels() {
        let profile = UserProfile {
            province: Some("กรุงเทพ".into()),
            district: Some("จตุจักร".into()),
            subdistrict: Some("  ".into()),
            ..Default::default()
        };
        assert!(profile.saved_location().is_none());
    }

    #[test]
    fn test_saved_location_zip_is_optional() {
        let profile = UserProfile {
            province: Some("กรุงเทพ".into()),
            district: Some("จตุจักร".into()),
            subdistrict: Some("จตุจักร".into()),
            zip_code: Some(String::new()),
            ..Default::default()
        };
        let location = profile.saved_location().unwrap();
        assert_eq!(location.subdistrict, "จตุจักร");
        assert_eq!(location.zip_code, None);
    }

    #[test]
    fn test_profile_document_tolerates_missing_fields() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"user_id":"u1","role":"employer","zip_code":"10900"}"#).unwrap();
        assert_eq!(profile.role, Some(UserRole::Employer));
        assert!(profile.province.is_none());
        assert!(profile.saved_location().is_none());
    }
}
