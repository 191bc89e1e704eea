//! Activity parser - Normalises inbound activities and console input

use crate::domain::entities::{Activity, ChannelAccount};

/// A parsed line of console input
#[derive(Debug, Clone)]
pub enum ConsoleInput {
    Command { name: String, args: Vec<String> },
    Message(Activity),
}

/// Turns raw channel input into activities the turn handler understands
pub struct ActivityParser {
    command_prefix: String,
}

impl ActivityParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Text the turn should be recognized from
    ///
    /// Card buttons submit `{"choice": "..."}` with no text, so the choice
    /// stands in for the text in that case.
    pub fn utterance(&self, activity: &Activity) -> Option<String> {
        let text = activity
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(text) = text {
            return Some(text.to_string());
        }

        activity
            .value
            .as_ref()
            .and_then(|v| v.get("choice"))
            .and_then(|c| c.as_str())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }

    /// Parse one console line
    pub fn parse_console(
        &self,
        conversation_id: &str,
        user: &ChannelAccount,
        bot: &ChannelAccount,
        line: &str,
    ) -> ConsoleInput {
        let line = line.trim();

        if let Some(cmd_text) = line.strip_prefix(self.command_prefix.as_str()) {
            let mut parts = cmd_text.split_whitespace();
            let name = parts.next().unwrap_or("").to_lowercase();
            let args = parts.map(|s| s.to_string()).collect();
            return ConsoleInput::Command { name, args };
        }

        let mut activity = Activity::message("console", conversation_id, user.clone(), line);
        activity.recipient = bot.clone();
        ConsoleInput::Message(activity)
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }
}
