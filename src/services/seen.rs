use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{MediaId, MediaType};

/// Read-only access to the user's seen-items history
///
/// Injected once at service construction rather than threaded through every
/// call. The recommended mode uses it to pick a seed item; nothing else in
/// the feed engine reads user data.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SeenItemsProvider: Send + Sync {
    /// Snapshot of the identities the user has marked seen
    async fn seen_items(&self) -> AppResult<Vec<MediaId>>;
}

/// Seen-item document as stored in the per-user document store
#[derive(Debug, Clone, Deserialize)]
pub struct SeenItemDoc {
    pub id: u64,
    pub media_type: MediaType,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

/// Provider backed by the remote per-user document store
///
/// Reads the `seenItems` collection under the configured user. The store
/// owns the wire format; only the identity fields matter here, extra
/// document fields are ignored.
pub struct UserStoreSeenItems {
    http_client: HttpClient,
    base_url: String,
    uid: String,
    token: Option<String>,
}

impl UserStoreSeenItems {
    pub fn new(base_url: String, uid: String, token: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            uid,
            token,
        }
    }
}

#[async_trait::async_trait]
impl SeenItemsProvider for UserStoreSeenItems {
    async fn seen_items(&self) -> AppResult<Vec<MediaId>> {
        let url = format!("{}/users/{}/seenItems", self.base_url, self.uid);

        let mut request = self.http_client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::UserStore(format!(
                "User store returned status {}",
                status
            )));
        }

        let docs: Vec<SeenItemDoc> = response.json().await?;
        tracing::debug!(count = docs.len(), "Seen items snapshot loaded");

        Ok(docs
            .into_iter()
            .map(|doc| MediaId {
                media_type: doc.media_type,
                id: doc.id,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_item_doc_deserialization() {
        let json = r#"{
            "id": 603,
            "media_type": "movie",
            "added_at": "2024-11-02T18:30:00Z"
        }"#;

        let doc: SeenItemDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, 603);
        assert_eq!(doc.media_type, MediaType::Movie);
        assert!(doc.added_at.is_some());
    }

    #[test]
    fn test_seen_item_doc_tolerates_missing_timestamp_and_extra_fields() {
        let json = r#"{
            "id": 1396,
            "media_type": "tv",
            "title": "Breaking Bad",
            "seasons_watched": 5
        }"#;

        let doc: SeenItemDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, 1396);
        assert_eq!(doc.media_type, MediaType::Tv);
        assert_eq!(doc.added_at, None);
    }
}
