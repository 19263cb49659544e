use reqflow_llm::client::PromptClient;
use reqflow_llm::error::PromptError;
use reqflow_llm::openai::OpenAiClient;
use reqflow_llm::types::CompletionRequest;

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
    })
    .to_string()
}

#[test]
fn empty_api_key_is_rejected() {
    match OpenAiClient::new("") {
        Err(PromptError::Authentication { .. }) => {}
        other => panic!("Expected authentication error, got: {:?}", other),
    }
}

#[test]
fn client_is_usable_as_trait_object() {
    let client: Box<dyn PromptClient> = Box::new(OpenAiClient::new("test-key").unwrap());
    assert_eq!(client.provider_name(), "openai");
    assert_eq!(client.model_name(), "gpt-4o");
}

#[tokio::test]
async fn complete_parses_answer_and_usage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("Use an outbox table."))
        .create_async()
        .await;

    let client = OpenAiClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let response = client
        .complete(
            CompletionRequest::builder()
                .model("gpt-4o")
                .system("You are a solution architect.")
                .user_message("How do we keep the systems in sync?")
                .build(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, "Use an outbox table.");
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 12);
    assert_eq!(usage.output_tokens, 7);
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#)
        .create_async()
        .await;

    let client = OpenAiClient::new("bad-key")
        .unwrap()
        .with_base_url(server.url());

    let result = client
        .complete(
            CompletionRequest::builder()
                .user_message("Hello")
                .build(),
        )
        .await;

    match result.unwrap_err() {
        PromptError::Authentication { message } => {
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("Expected authentication error, got: {:?}", other),
    }
}

#[tokio::test]
async fn server_error_keeps_structured_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "The server had an error", "type": "server_error", "code": null}}"#)
        .create_async()
        .await;

    let client = OpenAiClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let error = client
        .complete(CompletionRequest::builder().user_message("Hello").build())
        .await
        .unwrap_err();

    match &error {
        PromptError::Api { status, .. } => assert_eq!(*status, 500),
        other => panic!("Expected api error, got: {:?}", other),
    }
    let body = error.remote_body().expect("structured body retained");
    assert_eq!(
        body.pointer("/error/message").and_then(|v| v.as_str()),
        Some("The server had an error")
    );
}

#[tokio::test]
async fn empty_choices_is_an_internal_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": "chatcmpl-2", "object": "chat.completion", "model": "gpt-4o", "choices": [], "usage": null}"#,
        )
        .create_async()
        .await;

    let client = OpenAiClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let result = client
        .complete(CompletionRequest::builder().user_message("Hello").build())
        .await;

    match result.unwrap_err() {
        PromptError::Internal { .. } => {}
        other => panic!("Expected internal error, got: {:?}", other),
    }
}
