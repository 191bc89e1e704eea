//! In-memory state storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::traits::StateStore;
use crate::domain::entities::{ConversationState, UserProfile};
use crate::application::errors::StorageError;

/// Process-local store, state is lost on restart
#[derive(Default, Clone)]
pub struct MemoryStore {
    conversations: Arc<RwLock<HashMap<String, ConversationState>>>,
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_conversation(&self, key: &str) -> Result<Option<ConversationState>, StorageError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(key).cloned())
    }

    async fn save_conversation(&self, key: &str, state: &ConversationState) -> Result<(), StorageError> {
        let mut conversations = self.conversations.write().await;
        conversations.insert(key.to_string(), state.clone());
        Ok(())
    }

    async fn delete_conversation(&self, key: &str) -> Result<(), StorageError> {
        let mut conversations = self.conversations.write().await;
        conversations.remove(key);
        Ok(())
    }

    async fn load_profile(&self, key: &str) -> Result<Option<UserProfile>, StorageError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(key).cloned())
    }

    async fn save_profile(&self, key: &str, profile: &UserProfile) -> Result<(), StorageError> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(key.to_string(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Shape;

    #[tokio::test]
    async fn test_conversations_are_keyed() {
        let store = MemoryStore::new();
        let mut state = ConversationState::default();
        state.selection.shape = Some(Shape::Round);

        store.save_conversation("web/conversations/a", &state).await.unwrap();
        assert_eq!(store.load_conversation("web/conversations/a").await.unwrap(), Some(state));
        assert_eq!(store.load_conversation("web/conversations/b").await.unwrap(), None);

        store.delete_conversation("web/conversations/a").await.unwrap();
        assert_eq!(store.load_conversation("web/conversations/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_profiles() {
        let store = MemoryStore::new();
        let profile = UserProfile::new().with_name("Ada");
        store.save_profile("web/users/1", &profile).await.unwrap();
        assert_eq!(store.load_profile("web/users/1").await.unwrap(), Some(profile));
    }
}
