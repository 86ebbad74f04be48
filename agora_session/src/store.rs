use std::collections::HashMap;

use agora_core::{Message, Role, Session, SessionInfo, SessionStorage};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// In-memory map from session id to its ordered message log.
///
/// Sessions live until cleared or until the process exits. There is no
/// eviction and no size bound. The lock only covers single operations, so two
/// requests appending to the same session may interleave.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        info!("Session store initialized");
        Self::default()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStorage for SessionStore {
    async fn get_history(&self, id: &str) -> anyhow::Result<Vec<Message>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Ok(session.messages.clone());
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!("Created session: {id}");
            Session::new(id)
        });
        Ok(session.messages.clone())
    }

    async fn add_message(&self, id: &str, role: Role, content: &str) -> anyhow::Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id))
            .messages
            .push(Message::new(role, content));

        debug!("Added {role} message to session: {id}");
        Ok(())
    }

    async fn clear_session(&self, id: &str) -> anyhow::Result<bool> {
        let existed = self.sessions.write().await.remove(id).is_some();
        if existed {
            info!("Cleared session: {id}");
        }
        Ok(existed)
    }

    async fn list_sessions(&self) -> anyhow::Result<Vec<String>> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn session_info(&self, id: &str) -> anyhow::Result<Option<SessionInfo>> {
        Ok(self.sessions.read().await.get(id).map(Session::info))
    }

    async fn message_count(&self, id: &str) -> anyhow::Result<usize> {
        Ok(self
            .sessions
            .read()
            .await
            .get(id)
            .map_or(0, |s| s.messages.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn history_keeps_call_order() {
        let store = SessionStore::new();
        let roles = [Role::User, Role::Pro, Role::Con, Role::Moderator, Role::User];

        for (i, role) in roles.iter().enumerate() {
            store
                .add_message("s1", *role, &format!("message {i}"))
                .await
                .unwrap();
        }

        let history = store.get_history("s1").await.unwrap();
        assert_eq!(history.len(), roles.len());
        for (i, (msg, role)) in history.iter().zip(roles).enumerate() {
            assert_eq!(msg.role, role);
            assert_eq!(msg.content, format!("message {i}"));
        }
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn get_history_creates_missing_session() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);

        let history = store.get_history("fresh").await.unwrap();
        assert!(history.is_empty());
        assert_eq!(store.len().await, 1);
        assert_eq!(store.list_sessions().await.unwrap(), vec!["fresh".to_string()]);
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn clear_existing_session() {
        let store = SessionStore::new();
        store.add_message("s1", Role::User, "topic").await.unwrap();

        assert!(store.clear_session("s1").await.unwrap());
        assert_eq!(store.len().await, 0);

        let history = store.get_history("s1").await.unwrap();
        assert!(history.is_empty());
        assert_eq!(store.message_count("s1").await.unwrap(), 0);
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn clear_missing_session_returns_false() {
        let store = SessionStore::new();
        assert!(!store.clear_session("ghost").await.unwrap());
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn info_tracks_last_activity() {
        let store = SessionStore::new();
        assert!(store.session_info("s1").await.unwrap().is_none());

        store.get_history("s1").await.unwrap();
        let info = store.session_info("s1").await.unwrap().unwrap();
        assert_eq!(info.message_count, 0);
        assert_eq!(info.last_activity, info.created_at);

        store.add_message("s1", Role::Pro, "argument").await.unwrap();
        let history = store.get_history("s1").await.unwrap();
        let info = store.session_info("s1").await.unwrap().unwrap();
        assert_eq!(info.message_count, 1);
        assert_eq!(info.last_activity, history[0].timestamp);
        assert!(info.last_activity >= info.created_at);
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn message_count_does_not_create_sessions() {
        let store = SessionStore::new();
        assert_eq!(store.message_count("nobody").await.unwrap(), 0);
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "Test failure should panic")]
    async fn sessions_are_listed_sorted() {
        let store = SessionStore::new();
        for id in ["b", "c", "a"] {
            store.add_message(id, Role::User, "x").await.unwrap();
        }
        assert_eq!(store.list_sessions().await.unwrap(), vec!["a", "b", "c"]);
    }
}
