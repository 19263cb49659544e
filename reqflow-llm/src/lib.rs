pub mod client;
pub mod error;
pub mod openai;
pub mod types;

pub use client::PromptClient;
pub use error::PromptError;
pub use types::{ChatMessage, CompletionRequest, CompletionResponse, Role, Usage};
