//! Folds streamed patch frames into the final assistant answer.

use crate::sinks::ProgressSink;
use crate::types::StreamFrame;
use crate::Error;

/// The result of applying one frame.
#[derive(Debug)]
pub enum StepOutcome {
    /// The frame was folded in; keep reading.
    Continue,

    /// The stream signaled a terminal failure; stop reading.
    Abort(Error),
}

impl StepOutcome {
    /// Returns true if this outcome aborts the stream.
    pub fn is_abort(&self) -> bool {
        matches!(self, StepOutcome::Abort(_))
    }
}

/// Accumulates streamed output text for one conversation.
///
/// Frames are applied in stream order and ops within a frame in array order,
/// so the content grows by pure appends. Each accepted op publishes the full
/// accumulated snapshot to the progress sink. Completion is signaled by the
/// stream ending, never by a frame.
pub struct PatchAccumulator {
    conversation_id: String,
    content: String,
}

impl PatchAccumulator {
    /// Creates an empty accumulator for a conversation.
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: String::new(),
        }
    }

    /// Applies one frame.
    ///
    /// An error frame aborts immediately with its detail; a patch frame
    /// appends every meaningful op and ignores the rest.
    pub fn apply(&mut self, frame: &StreamFrame, progress: &dyn ProgressSink) -> StepOutcome {
        match frame {
            StreamFrame::Error(err) => {
                tracing::debug!(
                    conversation_id = %self.conversation_id,
                    kind = %err.error,
                    "stream signaled an error"
                );
                StepOutcome::Abort(Error::stream(err.detail.clone()))
            }
            StreamFrame::Patch(patch) => {
                for op in &patch.ops {
                    if let Some(text) = op.streamed_text() {
                        self.content.push_str(text);
                        progress.set_progress(&self.conversation_id, &self.content);
                    }
                }
                StepOutcome::Continue
            }
        }
    }

    /// The content accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consumes the accumulator, returning the final content.
    pub fn into_content(self) -> String {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{ErrorFrame, PatchFrame, PatchOp, STREAMED_OUTPUT_PATH};

    /// Records every snapshot it receives.
    #[derive(Default)]
    struct RecordingSink {
        snapshots: Mutex<Vec<(String, String)>>,
    }

    impl ProgressSink for RecordingSink {
        fn set_progress(&self, conversation_id: &str, content: &str) {
            self.snapshots
                .lock()
                .unwrap()
                .push((conversation_id.to_string(), content.to_string()));
        }

        fn clear_progress(&self, _conversation_id: &str) {}
    }

    fn add_op(value: &str) -> PatchOp {
        PatchOp {
            op: "add".to_string(),
            path: STREAMED_OUTPUT_PATH.to_string(),
            value: Some(serde_json::Value::String(value.to_string())),
        }
    }

    #[test]
    fn accumulation_is_append_only_and_order_preserving() {
        let sink = RecordingSink::default();
        let mut acc = PatchAccumulator::new("conv-1");

        for value in ["v1", "v2", "v3"] {
            let outcome = acc.apply(&StreamFrame::append(value), &sink);
            assert!(!outcome.is_abort());
        }

        assert_eq!(acc.content(), "v1v2v3");
        let snapshots = sink.snapshots.lock().unwrap();
        let contents: Vec<&str> = snapshots.iter().map(|(_, c)| c.as_str()).collect();
        assert_eq!(contents, vec!["v1", "v1v2", "v1v2v3"]);
        assert!(snapshots.iter().all(|(id, _)| id == "conv-1"));
    }

    #[test]
    fn ops_within_a_frame_apply_in_array_order() {
        let sink = RecordingSink::default();
        let mut acc = PatchAccumulator::new("conv-1");

        let frame = StreamFrame::Patch(PatchFrame {
            ops: vec![add_op("a"), add_op("b"), add_op("c")],
        });
        acc.apply(&frame, &sink);

        assert_eq!(acc.content(), "abc");
        let snapshots = sink.snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[1].1, "ab");
    }

    #[test]
    fn irrelevant_ops_are_no_ops() {
        let sink = RecordingSink::default();
        let mut acc = PatchAccumulator::new("conv-1");

        let frame = StreamFrame::Patch(PatchFrame {
            ops: vec![
                PatchOp {
                    op: "replace".to_string(),
                    path: STREAMED_OUTPUT_PATH.to_string(),
                    value: Some(serde_json::Value::String("x".to_string())),
                },
                PatchOp {
                    op: "add".to_string(),
                    path: "/logs/-".to_string(),
                    value: Some(serde_json::Value::String("x".to_string())),
                },
                PatchOp {
                    op: "add".to_string(),
                    path: STREAMED_OUTPUT_PATH.to_string(),
                    value: None,
                },
            ],
        });
        let outcome = acc.apply(&frame, &sink);

        assert!(!outcome.is_abort());
        assert_eq!(acc.content(), "");
        assert!(sink.snapshots.lock().unwrap().is_empty());
    }

    #[test]
    fn error_frame_aborts_with_detail() {
        let sink = RecordingSink::default();
        let mut acc = PatchAccumulator::new("conv-1");

        acc.apply(&StreamFrame::append("v1"), &sink);
        acc.apply(&StreamFrame::append("v2"), &sink);

        let frame = StreamFrame::Error(ErrorFrame {
            error: "x".to_string(),
            detail: Some("y".to_string()),
            event: None,
        });
        let outcome = acc.apply(&frame, &sink);

        let StepOutcome::Abort(err) = outcome else {
            panic!("expected abort");
        };
        assert_eq!(err.user_message(), "y");
        // Content up to the abort is retained for diagnostics.
        assert_eq!(acc.content(), "v1v2");
    }

    #[test]
    fn error_frame_without_detail_uses_fallback() {
        let sink = RecordingSink::default();
        let mut acc = PatchAccumulator::new("conv-1");

        let frame = StreamFrame::Error(ErrorFrame {
            error: "stream_error".to_string(),
            detail: None,
            event: Some("on_chain_error".to_string()),
        });
        let StepOutcome::Abort(err) = acc.apply(&frame, &sink) else {
            panic!("expected abort");
        };
        assert_eq!(err.user_message(), "An error occurred");
    }
}
