use serde::{Deserialize, Serialize};

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: MessageRole,

    /// The content of the message.
    pub content: String,
}

/// Role type for a conversation message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The user asking questions.
    Human,

    /// The assistant answering them.
    Assistant,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new human `Message`.
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Human, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Returns true if the content is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Self::human(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Self::human(content)
    }
}
