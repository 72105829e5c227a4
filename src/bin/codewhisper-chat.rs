//! Interactive chat client for a running CodeWhisper server.
//!
//! This binary provides a streaming REPL: questions are sent with the
//! configured file scope and prior exchanges, and the answer is printed
//! token by token as it streams back.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local server
//! codewhisper-chat
//!
//! # Point at another server with files in scope
//! codewhisper-chat --url http://dev-box:6969 --files src/main.rs,src/lib.rs
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/files <a,b,c>` - Replace the file scope
//! - `/clear` - Clear conversation history
//! - `/quit` - Exit the application
//!
//! Ctrl+C during a response cancels that stream.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use arrrg::CommandLine;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use codewhisper_client::{
    ChatArgs, ClientConfig, CodeWhisper, ConversationSink, Message, Notifier, ProgressSink,
    StreamCoordinator,
};

const CONVERSATION_ID: &str = "terminal";

/// Conversation store for the REPL: one flat message list.
#[derive(Default)]
struct SharedHistory {
    messages: Mutex<Vec<Message>>,
}

impl ConversationSink for SharedHistory {
    fn add_message(&self, message: Message, _conversation_id: &str, _background: bool) {
        self.messages.lock().unwrap().push(message);
    }

    fn remove_streaming(&self, _conversation_id: &str) {}
}

/// Prints each snapshot's unseen suffix, so the answer appears token by
/// token.
#[derive(Default)]
struct TokenPrinter {
    printed: Mutex<usize>,
}

impl ProgressSink for TokenPrinter {
    fn set_progress(&self, _conversation_id: &str, content: &str) {
        let mut printed = self.printed.lock().unwrap();
        if content.len() > *printed {
            print!("{}", &content[*printed..]);
            let _ = std::io::stdout().flush();
            *printed = content.len();
        }
    }

    fn clear_progress(&self, _conversation_id: &str) {
        *self.printed.lock().unwrap() = 0;
    }
}

struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

fn help_text() -> &'static str {
    "/help           Show this help\n\
     /files <a,b,c>  Replace the file scope\n\
     /clear          Clear conversation history\n\
     /quit           Exit"
}

/// Main entry point for the codewhisper-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("codewhisper-chat [OPTIONS]");
    let config = ClientConfig::from(args);
    let mut files = config.files.clone();

    let client = CodeWhisper::with_options(config.base_url.clone(), Some(config.timeout))?;
    println!("CodeWhisper Chat ({})", client.base_url());

    if let Err(err) = client.health().await {
        eprintln!("warning: server health check failed: {err}");
    } else if let Ok(model) = client.current_model().await {
        println!("Model: {} via {}", model.model_id, model.endpoint);
    }

    let history = Arc::new(SharedHistory::default());
    let printer = Arc::new(TokenPrinter::default());
    let coordinator = Arc::new(StreamCoordinator::new(
        client,
        history.clone(),
        printer.clone(),
        Arc::new(TerminalNotifier),
    ));

    // Ctrl+C during a response cancels that stream.
    let interrupt = coordinator.clone();
    ctrlc::set_handler(move || {
        interrupt.cancel(CONVERSATION_ID);
    })?;

    println!("Type /help for commands, /quit to exit\n");

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if let Some(command) = line.strip_prefix('/') {
                    let (name, rest) = match command.split_once(char::is_whitespace) {
                        Some((name, rest)) => (name, rest.trim()),
                        None => (command, ""),
                    };
                    match name {
                        "quit" | "exit" => {
                            println!("Goodbye!");
                            break;
                        }
                        "help" => {
                            for help_line in help_text().lines() {
                                println!("    {}", help_line.trim_start());
                            }
                        }
                        "clear" => {
                            history.messages.lock().unwrap().clear();
                            println!("Conversation cleared.");
                        }
                        "files" => {
                            files = rest
                                .split(',')
                                .map(str::trim)
                                .filter(|f| !f.is_empty())
                                .map(String::from)
                                .collect();
                            println!("{} file(s) in scope.", files.len());
                        }
                        _ => {
                            eprintln!("Unknown command: /{name}");
                        }
                    }
                    continue;
                }

                // Regular message - send to the server.
                history
                    .messages
                    .lock()
                    .unwrap()
                    .push(Message::human(line.clone()));
                let snapshot = history.messages.lock().unwrap().clone();

                println!("Assistant:");
                let result = coordinator
                    .send_payload(CONVERSATION_ID, &line, &snapshot, &files, true, None)
                    .await;
                println!();
                // Failures were already surfaced through the notifier.
                let _ = result;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {err}");
                break;
            }
        }
    }

    Ok(())
}
