use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{ConversationState, UserProfile};

/// State store - per-conversation and per-user persistence
#[async_trait]
pub trait StateStore: Send + Sync {
    // Conversation state, keyed by `{channel}/conversations/{id}`
    async fn load_conversation(&self, key: &str) -> Result<Option<ConversationState>, StorageError>;
    async fn save_conversation(&self, key: &str, state: &ConversationState) -> Result<(), StorageError>;
    async fn delete_conversation(&self, key: &str) -> Result<(), StorageError>;

    // User profiles, keyed by `{channel}/users/{id}`
    async fn load_profile(&self, key: &str) -> Result<Option<UserProfile>, StorageError>;
    async fn save_profile(&self, key: &str, profile: &UserProfile) -> Result<(), StorageError>;
}
