use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::message;
use crate::models::user::Role;

/// Outgoing chat message, shared by the HTTP and socket transports
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    #[validate(length(max = 5000))]
    pub text: Option<String>,
    #[validate(length(max = 2048))]
    pub file_url: Option<String>,
    #[validate(length(max = 100))]
    pub file_type: Option<String>,
}

impl SendMessageRequest {
    /// Text after trimming, `None` when blank
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn file_url(&self) -> Option<&str> {
        self.file_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    #[serde(flatten)]
    pub message: message::Model,
    pub sent_by_me: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatPartner {
    pub user_id: i64,
    pub name: String,
    pub img: Option<String>,
    pub role: Role,
    pub is_online: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub chat_with: ChatPartner,
    pub messages: Vec<ConversationMessage>,
}

/// One row of the recent-chats sidebar
#[derive(Debug, Clone, Serialize)]
pub struct RecentChat {
    pub user_id: i64,
    pub name: String,
    pub img: Option<String>,
    pub role: Role,
    pub last_message: Option<String>,
    pub last_message_time: DateTime<Utc>,
    pub sent_by_me: bool,
    pub is_online: bool,
}

/// Frames pushed to a bound socket
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    Message { data: message::Model },
    Error { message: String },
}

impl OutboundFrame {
    pub fn to_text(&self) -> String {
        // Serializing these variants cannot fail: every field is a plain value
        serde_json::to_string(self).unwrap_or_else(|_| "{\"type\":\"error\"}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_treated_as_missing() {
        let req = SendMessageRequest {
            receiver_id: 2,
            text: Some("   ".to_string()),
            file_url: None,
            file_type: None,
        };
        assert!(req.text().is_none());
    }

    #[test]
    fn test_error_frame_shape() {
        let frame = OutboundFrame::Error {
            message: "Receiver not found".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&frame.to_text()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "Receiver not found");
    }
}
