// Public modules
pub mod accumulator;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod observability;
pub mod sinks;
pub mod sse;
pub mod types;

// Re-exports
pub use accumulator::{PatchAccumulator, StepOutcome};
pub use client::CodeWhisper;
pub use config::{ChatArgs, ClientConfig};
pub use coordinator::{CompletionCallback, StreamCoordinator};
pub use error::{Error, Result};
pub use history::{build_history, clean_messages};
pub use sinks::{ConversationSink, Notifier, ProgressSink};
pub use sse::decode_frames;
pub use types::*;
