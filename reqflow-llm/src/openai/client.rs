use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    client::PromptClient,
    error::PromptError,
    openai::types::{
        ApiErrorResponse, ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse,
    },
    types::{CompletionRequest, CompletionResponse, Usage},
};

const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI-compatible prompt client
#[derive(Debug)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, PromptError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PromptError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 minute timeout
            .build()
            .map_err(|e| PromptError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: "https://api.openai.com".to_string(),
            model: DEFAULT_MODEL.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Run a raw chat completion against the wire API
    pub async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, PromptError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!(model = %request.model, "Sending chat completion request");

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| PromptError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| PromptError::Network { source: e })?;

        let status = response.status();

        if status.is_success() {
            let completion: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| PromptError::internal(format!("Failed to parse response: {}", e)))?;
            return Ok(completion);
        }

        // Extract retry-after header before consuming the response
        let retry_after = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
        } else {
            None
        };

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Try to parse as a structured error response
        if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
            let body = serde_json::from_str::<serde_json::Value>(&error_text).ok();
            let message = error_response.error.message;
            return match status {
                reqwest::StatusCode::BAD_REQUEST => Err(PromptError::invalid_request(message)),
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    Err(PromptError::authentication(message))
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    Err(PromptError::rate_limit(message, retry_after))
                }
                _ => Err(PromptError::api_error(status.as_u16(), message, body)),
            };
        }

        // Fallback for non-standard error responses
        match status {
            reqwest::StatusCode::BAD_REQUEST => Err(PromptError::invalid_request(error_text)),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(PromptError::authentication(error_text))
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                Err(PromptError::rate_limit(error_text, retry_after))
            }
            _ => Err(PromptError::api_error(status.as_u16(), error_text, None)),
        }
    }
}

#[async_trait]
impl PromptClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, PromptError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatCompletionMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for message in &request.messages {
            messages.push(ChatCompletionMessage {
                role: message.role.to_string(),
                content: message.content.clone(),
            });
        }

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let wire_request = ChatCompletionRequest {
            model,
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        };

        let completion = self.create_chat_completion(wire_request).await?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| PromptError::internal("Response contained no choices"))?;

        Ok(CompletionResponse {
            content,
            model: completion.model,
            usage: completion.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
