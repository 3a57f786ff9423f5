//! Profile store backed by a hosted document database reached over HTTPS.
//!
//! Profiles live at `{base_url}/users/{user_id}` as JSON documents. Reads are
//! a single attempt with no retry; a `404` means the user has no profile yet.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::profile::models::{SavedLocation, UserProfile};
use crate::profile::store::{ProfileStore, ProfileStoreError};

const USERS_COLLECTION: &str = "users";

#[derive(Debug, Serialize)]
struct LocationPatch<'a> {
    province: &'a str,
    district: &'a str,
    subdistrict: &'a str,
    zip_code: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    error: DocumentErrorBody,
}

#[derive(Debug, Deserialize)]
struct DocumentErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct DocumentProfileStore {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl DocumentProfileStore {
    pub fn new(
        base_url: &str,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self, ProfileStoreError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ProfileStoreError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ProfileStoreError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            api_key,
        })
    }

    /// `{base_url}/users/{user_id}`, with the id percent-encoded as one segment.
    /// Dot segments are rejected since the URL parser would drop them and
    /// address the collection instead.
    fn document_url(&self, user_id: &str) -> Result<Url, ProfileStoreError> {
        if matches!(user_id, "" | "." | "..") {
            return Err(ProfileStoreError::InvalidUrl(format!(
                "user id {user_id:?} is not a document path segment"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProfileStoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(USERS_COLLECTION)
            .push(user_id);
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for DocumentProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileStoreError> {
        let url = self.document_url(user_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No profile document for user {user_id}");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Document store returned {status} for user {user_id}");
            return Err(status_error(status, body));
        }

        let body = response.text().await?;
        let mut profile: UserProfile = serde_json::from_str(&body)?;
        if profile.user_id.is_empty() {
            profile.user_id = user_id.to_string();
        }
        Ok(Some(profile))
    }

    async fn save_location(
        &self,
        user_id: &str,
        location: &SavedLocation,
    ) -> Result<(), ProfileStoreError> {
        let url = self.document_url(user_id)?;
        let patch = LocationPatch {
            province: &location.province,
            district: &location.district,
            subdistrict: &location.subdistrict,
            zip_code: location.zip_code.as_deref(),
        };

        let response = self
            .client
            .patch(url)
            .bearer_auth(&self.api_key)
            .json(&patch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        info!("Saved location document for user {user_id}");
        Ok(())
    }
}

fn status_error(status: StatusCode, body: String) -> ProfileStoreError {
    let message = serde_json::from_str::<DocumentError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    ProfileStoreError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str) -> DocumentProfileStore {
        DocumentProfileStore::new(base, "key".into(), None).unwrap()
    }

    #[test]
    fn test_document_url_appends_collection_and_id() {
        let url = store("https://docs.example.com/v1/fastlabor/")
            .document_url("abc123")
            .unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/v1/fastlabor/users/abc123");
    }

    #[test]
    fn test_document_url_encodes_user_id_as_one_segment() {
        let url = store("https://docs.example.com/v1")
            .document_url("a/../b")
            .unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/v1/users/a%2F..%2Fb");
    }

    #[test]
    fn test_document_url_rejects_dot_segments() {
        let store = store("https://docs.example.com/v1");
        for user_id in ["", ".", ".."] {
            let err = store.document_url(user_id).unwrap_err();
            assert!(matches!(err, ProfileStoreError::InvalidUrl(_)), "user id {user_id:?}");
        }
        // Dots inside a longer id are ordinary characters.
        let url = store.document_url("...").unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/v1/users/...");
    }

    #[tokio::test]
    async fn test_dot_user_id_never_reaches_the_collection() {
        // Unroutable port: a request that escaped the guard would fail with Http.
        let store = store("http://127.0.0.1:9/v1");
        let err = store.get_profile("..").await.unwrap_err();
        assert!(matches!(err, ProfileStoreError::InvalidUrl(_)));

        let location = SavedLocation {
            province: "กรุงเทพ".into(),
            district: "จตุจักร".into(),
            subdistrict: "จตุจักร".into(),
            zip_code: None,
        };
        let err = store.save_location(".", &location).await.unwrap_err();
        assert!(matches!(err, ProfileStoreError::InvalidUrl(_)));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let err = DocumentProfileStore::new("mailto:ops@example.com", "key".into(), None)
            .err()
            .unwrap();
        assert!(matches!(err, ProfileStoreError::InvalidUrl(_)));
    }

    #[test]
    fn test_status_error_prefers_structured_message() {
        let err = status_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"message":"permission denied"}}"#.into(),
        );
        assert_eq!(err.to_string(), "document store returned status 403: permission denied");

        let err = status_error(StatusCode::BAD_GATEWAY, "upstream down".into());
        assert!(err.to_string().ends_with("upstream down"));
    }
}
