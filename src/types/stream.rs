use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The patch path carrying streamed output text.
pub const STREAMED_OUTPUT_PATH: &str = "/streamed_output_str/-";

/// One patch operation within a progress frame.
///
/// `value` is kept as raw JSON so an operation carrying a non-string value
/// deserializes cleanly and is simply ignored downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchOp {
    /// The operation kind; only `"add"` is meaningful.
    pub op: String,

    /// The patch target path.
    pub path: String,

    /// The payload, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOp {
    /// Returns the streamed text this op appends, if it is an append to the
    /// streamed-output path with a string value.
    pub fn streamed_text(&self) -> Option<&str> {
        if self.op != "add" || self.path != STREAMED_OUTPUT_PATH {
            return None;
        }
        self.value.as_ref().and_then(Value::as_str)
    }
}

/// A progress frame: a batch of patch operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchFrame {
    /// Operations to apply, in array order.
    #[serde(default)]
    pub ops: Vec<PatchOp>,
}

/// A terminal failure signal embedded in the stream body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorFrame {
    /// The error kind reported by the server.
    pub error: String,

    /// Human-readable detail, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// The server-side event that failed, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

/// One decoded event from the stream body.
///
/// The error variant is tried first so an error frame can never be mistaken
/// for a patch frame; an object with neither field decodes as an empty patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StreamFrame {
    /// A terminal failure signal.
    Error(ErrorFrame),

    /// A batch of patch operations.
    Patch(PatchFrame),
}

impl StreamFrame {
    /// Convenience constructor for a single-op progress frame.
    pub fn append(value: impl Into<String>) -> Self {
        StreamFrame::Patch(PatchFrame {
            ops: vec![PatchOp {
                op: "add".to_string(),
                path: STREAMED_OUTPUT_PATH.to_string(),
                value: Some(Value::String(value.into())),
            }],
        })
    }
}
