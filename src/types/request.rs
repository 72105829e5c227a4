use serde::{Deserialize, Serialize};

/// One completed human/assistant exchange, sent as a two-element array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryPair(pub String, pub String);

impl HistoryPair {
    /// Create a new `HistoryPair` from a human question and assistant answer.
    pub fn new(human: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self(human.into(), assistant.into())
    }

    /// The human side of the exchange.
    pub fn human(&self) -> &str {
        &self.0
    }

    /// The assistant side of the exchange.
    pub fn assistant(&self) -> &str {
        &self.1
    }
}

/// The file scope accompanying a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeConfig {
    /// File paths currently in context.
    pub files: Vec<String>,

    /// The same paths comma-joined, for display and debugging.
    #[serde(rename = "fileList")]
    pub file_list: String,
}

impl ScopeConfig {
    /// Create a new `ScopeConfig` from a list of file paths.
    pub fn new(files: Vec<String>) -> Self {
        let file_list = files.join(", ");
        Self { files, file_list }
    }
}

/// The `input` object of a stream_log request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatInput {
    /// Completed prior exchanges, oldest first.
    pub chat_history: Vec<HistoryPair>,

    /// The current question.
    pub question: String,

    /// The file scope for this request.
    pub config: ScopeConfig,
}

/// The full body of a stream_log request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamLogRequest {
    /// The request input.
    pub input: ChatInput,
}

impl StreamLogRequest {
    /// Create a new request from a question, history, and file scope.
    pub fn new(question: impl Into<String>, chat_history: Vec<HistoryPair>, files: Vec<String>) -> Self {
        Self {
            input: ChatInput {
                chat_history,
                question: question.into(),
                config: ScopeConfig::new(files),
            },
        }
    }
}

/// The server's active model, as reported by `api/current-model`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier of the active model.
    pub model_id: String,

    /// The endpoint serving it.
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_pair_serializes_as_array() {
        let pair = HistoryPair::new("q", "a");
        assert_eq!(serde_json::to_string(&pair).unwrap(), r#"["q","a"]"#);
    }

    #[test]
    fn request_wire_shape() {
        let request = StreamLogRequest::new(
            "what does main do?",
            vec![HistoryPair::new("q1", "a1")],
            vec!["src/main.rs".to_string(), "src/lib.rs".to_string()],
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "input": {
                    "chat_history": [["q1", "a1"]],
                    "question": "what does main do?",
                    "config": {
                        "files": ["src/main.rs", "src/lib.rs"],
                        "fileList": "src/main.rs, src/lib.rs",
                    },
                },
            })
        );
    }

    #[test]
    fn empty_scope_has_empty_file_list() {
        let config = ScopeConfig::new(Vec::new());
        assert_eq!(config.file_list, "");
    }
}
