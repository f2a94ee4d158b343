use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::catalog::CatalogClient;
use crate::services::explore::ExploreService;
use crate::services::session::FeedSession;

/// Handle to one feed session in the registry
pub type SharedFeedSession = Arc<RwLock<FeedSession>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogClient>,
    pub explore: Arc<ExploreService>,
    sessions: Arc<RwLock<HashMap<Uuid, SharedFeedSession>>>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogClient>, explore: Arc<ExploreService>) -> Self {
        Self {
            catalog,
            explore,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolves a feed session, creating a fresh one when no id was sent or
    /// the id is unknown (e.g. the server restarted under the client).
    pub async fn session(&self, id: Option<Uuid>) -> SharedFeedSession {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(existing) = sessions.get(&id) {
                return existing.clone();
            }
        }

        let session = FeedSession::new();
        let id = session.id();
        let handle: SharedFeedSession = Arc::new(RwLock::new(session));
        sessions.insert(id, handle.clone());
        tracing::debug!(session_id = %id, "Created feed session");
        handle
    }

    /// Looks up an existing session without creating one
    pub async fn get_session(&self, id: Uuid) -> Option<SharedFeedSession> {
        self.sessions.read().await.get(&id).cloned()
    }
}
