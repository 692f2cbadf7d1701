//! Support chat and breakout room message models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{SUPPORT_KEYWORDS, SUPPORT_WELCOME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
    System,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Gif,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            sender_name: None,
            avatar: None,
            kind: MessageKind::Text,
        }
    }

    pub fn from_member(name: &str, avatar: &str, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            sender_name: Some(name.to_string()),
            avatar: Some(avatar.to_string()),
            kind,
            ..Self::new(ChatRole::User, text)
        }
    }
}

// ---------------------------------------------------------------------------
// Support chat
// ---------------------------------------------------------------------------

/// Who answers a support message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportRoute {
    LiveAgent,
    AiTutor,
}

/// Pricing, refunds and explicit requests for a human go to a live agent;
/// everything else goes to the AI tutor.
pub fn route_support_message(text: &str) -> SupportRoute {
    let lower = text.to_lowercase();
    if SUPPORT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        SupportRoute::LiveAgent
    } else {
        SupportRoute::AiTutor
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SupportConversation {
    messages: Vec<ChatMessage>,
}

impl SupportConversation {
    /// Opening an empty conversation posts the greeting.
    pub fn open(&mut self) {
        if self.messages.is_empty() {
            self.messages.push(ChatMessage::new(ChatRole::System, SUPPORT_WELCOME));
        }
    }

    /// Record a user message. Blank text is ignored.
    pub fn post_user(&mut self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        let msg = ChatMessage::new(ChatRole::User, text);
        self.messages.push(msg.clone());
        Some(msg)
    }

    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

// ---------------------------------------------------------------------------
// Breakout room
// ---------------------------------------------------------------------------

pub const TRENDY_GIFS: &[&str] = &[
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExcWc1bnd4dG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG4x/l0HlHFRbmaZtBRhXG/giphy.gif",
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExcWc1bnd4dG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG4x/xT5LMHxhOfscxPfIfm/giphy.gif",
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExcWc1bnd4dG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG4x/d31vTpVi1LAcDvdm/giphy.gif",
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExcWc1bnd4dG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG41eDN5d3Y5eGx5eG4x/26u4lOMA8JKSnL9Uk/giphy.gif",
];

/// Simulated group chat. Nothing is persisted or shared across processes.
#[derive(Debug, Clone, Serialize)]
pub struct BreakoutRoom {
    messages: Vec<ChatMessage>,
}

impl BreakoutRoom {
    pub fn new() -> Self {
        Self {
            messages: vec![
                ChatMessage::from_member(
                    "Sarah K.",
                    "SK",
                    "Has anyone tried the new Midjourney prompt strategy from Module 3?",
                    MessageKind::Text,
                ),
                ChatMessage::from_member(
                    "Thabo M.",
                    "TM",
                    "Yes! Totally game changer for my pitch deck.",
                    MessageKind::Text,
                ),
                ChatMessage::from_member("Thabo M.", "TM", TRENDY_GIFS[0], MessageKind::Gif),
            ],
        }
    }

    /// Post as the local user. Blank text is ignored.
    pub fn send(&mut self, text: &str, kind: MessageKind) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        let msg = ChatMessage::from_member("You", "ME", text, kind);
        self.messages.push(msg.clone());
        Some(msg)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

impl Default for BreakoutRoom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_routing() {
        assert_eq!(route_support_message("What does it COST?"), SupportRoute::LiveAgent);
        assert_eq!(route_support_message("can I get a refund"), SupportRoute::LiveAgent);
        assert_eq!(route_support_message("Explain NLP please"), SupportRoute::AiTutor);
    }

    #[test]
    fn test_support_greeting_once() {
        let mut chat = SupportConversation::default();
        chat.open();
        chat.open();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, ChatRole::System);
    }

    #[test]
    fn test_blank_messages_ignored() {
        let mut chat = SupportConversation::default();
        assert!(chat.post_user("  ").is_none());
        assert!(chat.messages().is_empty());

        let mut room = BreakoutRoom::new();
        assert!(room.send("", MessageKind::Text).is_none());
        assert_eq!(room.messages().len(), 3);
    }

    #[test]
    fn test_breakout_send_gif() {
        let mut room = BreakoutRoom::new();
        let msg = room.send(TRENDY_GIFS[2], MessageKind::Gif).unwrap();
        assert_eq!(msg.sender_name.as_deref(), Some("You"));
        assert_eq!(msg.kind, MessageKind::Gif);
        assert_eq!(room.messages().len(), 4);
    }
}
