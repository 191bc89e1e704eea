use async_trait::async_trait;
use crate::domain::entities::Activity;
use crate::application::errors::BotError;

/// Bot trait - abstraction for channel adapters that deliver replies
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the adapter
    async fn start(&self) -> Result<(), BotError>;

    /// Deliver one outbound activity, returns the channel's id for it
    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError>;

    /// Deliver the replies of a turn in order
    async fn send_activities(&self, activities: &[Activity]) -> Result<Vec<String>, BotError> {
        let mut ids = Vec::with_capacity(activities.len());
        for activity in activities {
            ids.push(self.send_activity(activity).await?);
        }
        Ok(ids)
    }

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
}
