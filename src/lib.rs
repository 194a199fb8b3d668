pub mod ai;
pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod signal;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatBackend, OllamaClient, FALLBACK_REPLY};
pub use app::{App, Flow, LoopExit, SYSTEM_INSTRUCTION};
pub use commands::Command;
pub use config::{Config, SamplingOptions};
pub use error::{ChatError, ConfigError};
pub use input::{InputEvent, InputHandler};
pub use state::{ChatMessage, ChatRole, Conversation};
