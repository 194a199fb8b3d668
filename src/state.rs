//! Conversation state shared between the control loop and the chat client.
//!
//! The loop owns the [`Conversation`]; the client only ever sees a borrowed
//! slice of [`ChatMessage`]s.

use serde::{Deserialize, Serialize};

/// A chat message in the AI conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered dialogue history, always headed by the system instruction.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system_text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_text)],
        }
    }

    /// Append a user turn. Blank text is ignored and `false` is returned.
    pub fn push_user(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::user(text));
        true
    }

    /// Append an assistant turn, including fallback text from a failed call.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(text));
    }

    /// Drop every turn after the system instruction.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system(&self) -> &ChatMessage {
        &self.messages[0]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: the system instruction is always present.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
