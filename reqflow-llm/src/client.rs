use crate::{
    error::PromptError,
    types::{CompletionRequest, CompletionResponse},
};
use async_trait::async_trait;

/// Core trait for question→answer prompt backends
#[async_trait]
pub trait PromptClient: Send + Sync {
    /// Run a completion request and return the answer
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, PromptError>;

    /// Get provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Get the default model this client talks to
    fn model_name(&self) -> &str;
}
