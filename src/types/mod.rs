//! Wire types for the CodeWhisper chat protocol.

mod message;
mod request;
mod stream;

pub use message::{Message, MessageRole};
pub use request::{ChatInput, HistoryPair, ModelInfo, ScopeConfig, StreamLogRequest};
pub use stream::{ErrorFrame, PatchFrame, PatchOp, StreamFrame, STREAMED_OUTPUT_PATH};
