//! Per-conversation streaming lifecycle.
//!
//! The coordinator owns the map of in-flight streams. For each request it
//! issues the HTTP call, folds the frame stream through a
//! [`PatchAccumulator`], and on any terminal transition runs the same
//! unconditional cleanup: the active entry, the progress entry, and the
//! conversation's streaming flag are all released exactly once whether the
//! stream completed, aborted, or was cancelled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::accumulator::{PatchAccumulator, StepOutcome};
use crate::client::CodeWhisper;
use crate::error::Result;
use crate::observability;
use crate::sinks::{ConversationSink, Notifier, ProgressSink};
use crate::types::{Message, StreamFrame};

/// Callback invoked at most once with the final content of a completed
/// stream; never invoked for empty content.
pub type CompletionCallback = Box<dyn FnOnce(String) + Send>;

/// Orchestrates streaming chat requests across conversations.
pub struct StreamCoordinator {
    client: CodeWhisper,
    conversations: Arc<dyn ConversationSink>,
    progress: Arc<dyn ProgressSink>,
    notifier: Arc<dyn Notifier>,
    active: Mutex<HashMap<String, CancellationToken>>,
}

impl StreamCoordinator {
    /// Creates a coordinator publishing to the given collaborators.
    pub fn new(
        client: CodeWhisper,
        conversations: Arc<dyn ConversationSink>,
        progress: Arc<dyn ProgressSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            conversations,
            progress,
            notifier,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true while a stream for the conversation is in flight.
    pub fn is_streaming(&self, conversation_id: &str) -> bool {
        self.active
            .lock()
            .unwrap()
            .contains_key(conversation_id)
    }

    /// Requests cooperative cancellation of a conversation's stream.
    ///
    /// The in-flight read loop stops before applying its next frame; nothing
    /// is published for a cancelled stream.
    pub fn cancel(&self, conversation_id: &str) {
        if let Some(token) = self.active.lock().unwrap().get(conversation_id) {
            token.cancel();
        }
    }

    /// Issues a chat request and streams the answer for one conversation.
    ///
    /// On completion with non-empty content the assistant message is handed
    /// to the conversation sink (flagged as background when
    /// `to_current_conversation` is false) and `on_complete` fires once. On
    /// any failure the classified message goes to the notifier and the error
    /// is returned. Every exit path releases the streaming state for this
    /// conversation exactly once.
    pub async fn send_payload(
        &self,
        conversation_id: &str,
        question: &str,
        messages: &[Message],
        file_scope: &[String],
        to_current_conversation: bool,
        on_complete: Option<CompletionCallback>,
    ) -> Result<String> {
        let cancel = CancellationToken::new();
        self.active
            .lock()
            .unwrap()
            .insert(conversation_id.to_string(), cancel.clone());
        let started = Instant::now();

        let outcome = self
            .consume(conversation_id, question, messages, file_scope, &cancel)
            .await;

        // Terminal transition: the cleanup below must run on every path.
        self.active.lock().unwrap().remove(conversation_id);
        self.progress.clear_progress(conversation_id);
        self.conversations.remove_streaming(conversation_id);
        observability::STREAM_DURATION.add(started.elapsed().as_secs_f64());

        match outcome {
            Ok(content) => {
                if cancel.is_cancelled() {
                    observability::STREAMS_CANCELLED.click();
                    tracing::debug!(conversation_id, "stream cancelled; content discarded");
                    return Ok(String::new());
                }
                observability::STREAMS_COMPLETED.click();
                tracing::debug!(
                    conversation_id,
                    content_len = content.len(),
                    "stream completed"
                );
                if !content.is_empty() {
                    if let Some(on_complete) = on_complete {
                        on_complete(content.clone());
                    }
                    self.conversations.add_message(
                        Message::assistant(content.clone()),
                        conversation_id,
                        !to_current_conversation,
                    );
                }
                Ok(content)
            }
            Err(err) => {
                observability::STREAM_ABORTS.click();
                tracing::debug!(conversation_id, error = %err, "stream aborted");
                self.notifier.notify_error(&err.user_message());
                Err(err)
            }
        }
    }

    async fn consume(
        &self,
        conversation_id: &str,
        question: &str,
        messages: &[Message],
        file_scope: &[String],
        cancel: &CancellationToken,
    ) -> Result<String> {
        let frames = self
            .client
            .stream_chat(question, messages, file_scope)
            .await?;
        let mut accumulator = PatchAccumulator::new(conversation_id);
        drain_frames(frames, &mut accumulator, self.progress.as_ref(), cancel).await?;
        Ok(accumulator.into_content())
    }
}

/// Drains a frame stream into the accumulator.
///
/// Cancellation is checked before each frame is applied; an error frame or a
/// transport read error stops the drain with that error.
async fn drain_frames<S>(
    frames: S,
    accumulator: &mut PatchAccumulator,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: Stream<Item = Result<StreamFrame>>,
{
    futures::pin_mut!(frames);
    while let Some(frame) = frames.next().await {
        if cancel.is_cancelled() {
            break;
        }
        match accumulator.apply(&frame?, progress) {
            StepOutcome::Continue => {}
            StepOutcome::Abort(err) => return Err(err),
        }
    }
    Ok(())
}
