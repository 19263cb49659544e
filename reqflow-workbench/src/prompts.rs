use std::sync::Arc;

use async_trait::async_trait;
use reqflow_llm::{CompletionRequest, PromptClient, PromptError};
use shared_types::Requirement;

/// AI prompt seam used by both workbenches. Every call is scoped to one
/// requirement; the answer comes back as plain text.
#[async_trait]
pub trait PromptService: Send + Sync {
    /// Produce a first-pass technical solution for a BA-approved requirement
    async fn generate_draft_solution(
        &self,
        requirement: &Requirement,
    ) -> Result<String, PromptError>;

    /// Answer an architect's clarifying question about the requirement
    async fn ask_clarifying_question(
        &self,
        requirement: &Requirement,
        question: &str,
    ) -> Result<String, PromptError>;

    /// Answer a business analyst's prompt about the requirement
    async fn ask_ai(&self, requirement: &Requirement, prompt: &str) -> Result<String, PromptError>;
}

/// `PromptService` backed by an LLM completion client.
pub struct LlmPromptService {
    client: Arc<dyn PromptClient>,
    max_tokens: u32,
}

impl LlmPromptService {
    pub fn new(client: Arc<dyn PromptClient>) -> Self {
        Self {
            client,
            max_tokens: 1024,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn architect_system_prompt() -> String {
        r#"You are a solution architect reviewing change requirements.
The business analysis for the requirement you are shown has already been approved.

YOUR ROLE:
- Draft concrete technical solutions: components, data flow, integration points
- Answer clarifying questions about feasibility and design trade-offs
- Stay within the scope of the requirement; do not invent new features

Keep answers structured and implementation-ready. When information is
missing, state the assumption you are making instead of asking back."#
            .to_string()
    }

    fn ba_system_prompt() -> String {
        r#"You are a business analyst refining change requirements.

YOUR ROLE:
- Turn rough requirement descriptions into precise business content
- Clarify scope, affected processes, and acceptance criteria
- Write for business stakeholders, not implementers

Answer in plain prose. Do not propose technical designs."#
            .to_string()
    }

    fn requirement_context(requirement: &Requirement) -> String {
        match &requirement.source_key {
            Some(key) => format!(
                "Requirement {} ({}):\n{}",
                requirement.id, key, requirement.description
            ),
            None => format!("Requirement {}:\n{}", requirement.id, requirement.description),
        }
    }

    async fn run(&self, system: String, user: String) -> Result<String, PromptError> {
        let request = CompletionRequest::builder()
            .model(self.client.model_name())
            .system(system)
            .user_message(user)
            .max_tokens(self.max_tokens)
            .build();

        let response = self.client.complete(request).await?;
        Ok(response.content)
    }
}

#[async_trait]
impl PromptService for LlmPromptService {
    async fn generate_draft_solution(
        &self,
        requirement: &Requirement,
    ) -> Result<String, PromptError> {
        tracing::debug!(
            requirement_id = %requirement.id,
            provider = self.client.provider_name(),
            "Generating draft technical solution"
        );
        let user = format!(
            "{}\n\nDraft a technical solution for this requirement.",
            Self::requirement_context(requirement)
        );
        self.run(Self::architect_system_prompt(), user).await
    }

    async fn ask_clarifying_question(
        &self,
        requirement: &Requirement,
        question: &str,
    ) -> Result<String, PromptError> {
        let user = format!(
            "{}\n\nQuestion from the architect:\n{}",
            Self::requirement_context(requirement),
            question
        );
        self.run(Self::architect_system_prompt(), user).await
    }

    async fn ask_ai(&self, requirement: &Requirement, prompt: &str) -> Result<String, PromptError> {
        let user = format!(
            "{}\n\nRequest from the business analyst:\n{}",
            Self::requirement_context(requirement),
            prompt
        );
        self.run(Self::ba_system_prompt(), user).await
    }
}
