//! Collaborator traits for streaming chat.
//!
//! The pipeline never owns the conversation store or the UI; it publishes
//! through these traits instead. Implement them to receive incremental
//! progress, finished messages, and user-facing error notifications.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Mutex;
//! use codewhisper_client::{Message, ProgressSink};
//!
//! struct Printer {
//!     printed: Mutex<usize>,
//! }
//!
//! impl ProgressSink for Printer {
//!     fn set_progress(&self, _conversation_id: &str, content: &str) {
//!         let mut printed = self.printed.lock().unwrap();
//!         print!("{}", &content[*printed..]);
//!         *printed = content.len();
//!     }
//!
//!     fn clear_progress(&self, _conversation_id: &str) {}
//! }
//! ```

use crate::types::Message;

/// Receives finished messages and streaming-lifecycle notifications for a
/// conversation store.
pub trait ConversationSink: Send + Sync {
    /// Add a finished message to the given conversation.
    ///
    /// `background` is true when the user has navigated away and the message
    /// belongs to a conversation that is no longer current.
    fn add_message(&self, message: Message, conversation_id: &str, background: bool);

    /// Called exactly once per request when its stream reaches a terminal
    /// state, whether or not a message was produced.
    fn remove_streaming(&self, conversation_id: &str);
}

/// Receives incremental content snapshots during streaming.
///
/// Writes are keyed by conversation id with last-write-wins semantics: each
/// snapshot is the full accumulated content so far, not a delta.
pub trait ProgressSink: Send + Sync {
    /// Publish the accumulated content for a conversation.
    fn set_progress(&self, conversation_id: &str, content: &str);

    /// Drop the progress entry for a conversation.
    fn clear_progress(&self, conversation_id: &str);
}

/// The single user-visible error channel.
///
/// At most one notification is emitted per request; consumers should replace
/// any prior notification rather than stack them.
pub trait Notifier: Send + Sync {
    /// Surface a user-facing error message.
    fn notify_error(&self, message: &str);
}
