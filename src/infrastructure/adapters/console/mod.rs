//! Console adapter for development/testing

use async_trait::async_trait;
use std::io::Write;

use crate::domain::entities::{Activity, ChannelAccount};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::cards::card_summary;
use crate::application::errors::BotError;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    user: ChannelAccount,
    conversation_id: String,
}

impl ConsoleAdapter {
    pub fn new(bot_id: impl Into<String>, bot_name: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: bot_id.into(),
                name: bot_name.into(),
            },
            user: ChannelAccount {
                id: "console-user".to_string(),
                name: Some("You".to_string()),
            },
            conversation_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn user(&self) -> &ChannelAccount {
        &self.user
    }

    pub fn bot_account(&self) -> ChannelAccount {
        ChannelAccount {
            id: self.info.id.clone(),
            name: Some(self.info.name.clone()),
        }
    }

    /// The activity that opens a console session
    pub fn session_start(&self) -> Activity {
        Activity::conversation_update(
            "console",
            self.conversation_id.clone(),
            self.bot_account(),
            vec![self.bot_account(), self.user.clone()],
        )
    }

    /// Read one line from stdin, `None` on end of input
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();

        tokio::task::spawn_blocking(|| {
            let mut input = String::new();
            match std::io::stdin().read_line(&mut input) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(input.trim().to_string()),
            }
        })
        .await
        .ok()
        .flatten()
    }

    /// Lines printed for one outbound activity
    pub fn render(activity: &Activity) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(text) = activity.text.as_deref() {
            lines.push(format!("[BOT] {}", text));
        }
        for attachment in &activity.attachments {
            if attachment.is_adaptive_card() {
                lines.push(format!("[BOT] {}", card_summary(&attachment.content)));
            } else {
                lines.push(format!("[BOT] ({})", attachment.content_type));
            }
        }
        lines
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError> {
        for line in Self::render(activity) {
            println!("{}", line);
        }
        Ok(activity.id.clone().unwrap_or_else(|| "console_msg".to_string()))
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
