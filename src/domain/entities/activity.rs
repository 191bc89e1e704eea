use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type of adaptive card attachments
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

/// Type of activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
    #[serde(other)]
    Other,
}

impl Default for ActivityType {
    fn default() -> Self {
        Self::Message
    }
}

/// A participant of a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
}

/// Card or other rich content attached to an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub content: serde_json::Value,
}

impl Attachment {
    pub fn adaptive_card(content: serde_json::Value) -> Self {
        Self {
            content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
            content,
        }
    }

    pub fn is_adaptive_card(&self) -> bool {
        self.content_type == ADAPTIVE_CARD_CONTENT_TYPE
    }
}

/// One inbound or outbound turn payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_mode: Option<String>,
}

impl Activity {
    pub fn message(
        channel_id: impl Into<String>,
        conversation_id: impl Into<String>,
        from: ChannelAccount,
        text: impl Into<String>,
    ) -> Self {
        Self {
            activity_type: ActivityType::Message,
            id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp: Some(Utc::now()),
            channel_id: channel_id.into(),
            from,
            conversation: ConversationAccount { id: conversation_id.into() },
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn conversation_update(
        channel_id: impl Into<String>,
        conversation_id: impl Into<String>,
        recipient: ChannelAccount,
        members_added: Vec<ChannelAccount>,
    ) -> Self {
        Self {
            activity_type: ActivityType::ConversationUpdate,
            id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp: Some(Utc::now()),
            channel_id: channel_id.into(),
            recipient,
            conversation: ConversationAccount { id: conversation_id.into() },
            members_added,
            ..Default::default()
        }
    }

    /// Build an empty reply addressed back to the sender
    pub fn reply(&self) -> Self {
        Self {
            activity_type: ActivityType::Message,
            id: None,
            timestamp: Some(Utc::now()),
            channel_id: self.channel_id.clone(),
            service_url: self.service_url.clone(),
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            conversation: self.conversation.clone(),
            reply_to_id: self.id.clone(),
            ..Default::default()
        }
    }

    pub fn reply_text(&self, text: impl Into<String>) -> Self {
        let mut reply = self.reply();
        reply.text = Some(text.into());
        reply
    }

    pub fn reply_card(&self, card: serde_json::Value) -> Self {
        let mut reply = self.reply();
        reply.attachments.push(Attachment::adaptive_card(card));
        reply
    }

    pub fn expects_replies(&self) -> bool {
        self.delivery_mode.as_deref() == Some("expectReplies")
    }

    /// Storage key of this activity's conversation state
    pub fn conversation_key(&self) -> String {
        format!("{}/conversations/{}", self.channel_id, self.conversation.id)
    }

    /// Storage key of the sender's profile
    pub fn user_key(&self) -> String {
        format!("{}/users/{}", self.channel_id, self.from.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_channel_payload() {
        let raw = r#"{
            "type": "message",
            "id": "abc",
            "channelId": "emulator",
            "serviceUrl": "http://localhost:50000",
            "from": {"id": "user-1", "name": "User"},
            "recipient": {"id": "bot"},
            "conversation": {"id": "conv-1"},
            "text": "Round"
        }"#;
        let activity: Activity = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Message);
        assert_eq!(activity.text.as_deref(), Some("Round"));
        assert_eq!(activity.conversation_key(), "emulator/conversations/conv-1");
        assert_eq!(activity.user_key(), "emulator/users/user-1");
    }

    #[test]
    fn test_unknown_type_is_other() {
        let activity: Activity = serde_json::from_str(r#"{"type": "typing"}"#).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Other);
    }

    #[test]
    fn test_reply_swaps_participants() {
        let mut inbound = Activity::message("console", "c1", ChannelAccount::new("u1"), "hi");
        inbound.recipient = ChannelAccount::new("bot");

        let reply = inbound.reply_text("hello");
        assert_eq!(reply.from.id, "bot");
        assert_eq!(reply.recipient.id, "u1");
        assert_eq!(reply.reply_to_id, inbound.id);

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["replyToId"], serde_json::Value::String(inbound.id.unwrap()));
    }
}
