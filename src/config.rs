//! Configuration for the chat client.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration used by the `codewhisper-chat` binary.

use std::time::Duration;

use arrrg_derive::CommandLine;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Command-line arguments for the codewhisper-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Server base URL.
    #[arrrg(optional, "Server URL (default: CODEWHISPER_URL or localhost)", "URL")]
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 120)", "SECONDS")]
    pub timeout: Option<u32>,

    /// Comma-separated file paths to put in scope.
    #[arrrg(optional, "Comma-separated files to put in scope", "FILES")]
    pub files: Option<String>,
}

/// Resolved configuration for a chat client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The server base URL, if one was supplied.
    pub base_url: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// File paths in scope for every request.
    pub files: Vec<String>,
}

impl ClientConfig {
    /// Creates a new ClientConfig with default values.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            files: Vec::new(),
        }
    }

    /// Sets the server base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the file scope.
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ClientConfig {
    fn from(args: ChatArgs) -> Self {
        let files = args
            .files
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        ClientConfig {
            base_url: args.url,
            timeout: Duration::from_secs(
                args.timeout.map(u64::from).unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            files,
        }
    }
}
