use anyhow::anyhow;
use std::env;
use std::sync::Arc;

use crate::config::ApiConfig;
use reqflow_llm::openai::OpenAiClient;
use reqflow_llm::PromptClient;

/// Build the prompt client from config, falling back to the environment
/// for the API key.
pub fn create_prompt_client(config: &ApiConfig) -> anyhow::Result<Arc<dyn PromptClient>> {
    let llm = config.llm.clone().unwrap_or_default();

    let api_key = llm
        .api_key
        .or_else(|| env::var("OPENAI_API_KEY").ok())
        .ok_or_else(|| {
            anyhow!("No AI API key found. Set [llm].api_key in the config file or OPENAI_API_KEY.")
        })?;

    let mut client = OpenAiClient::new(api_key)?;
    if let Some(base_url) = llm.base_url {
        client = client.with_base_url(base_url);
    }
    if let Some(model) = llm.model {
        client = client.with_model(model);
    }

    Ok(Arc::new(client))
}
