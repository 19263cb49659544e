use reqflow_llm::PromptError;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("Another operation is already in flight")]
    Busy,

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Response must not be empty")]
    EmptyResponse,

    #[error("Approval was not confirmed")]
    NotConfirmed,

    #[error("Requirement is locked until business analysis is approved")]
    Locked,

    #[error("Requirement is not loaded")]
    NotLoaded,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("AI service error: {0}")]
    Prompt(#[from] PromptError),
}

impl WorkbenchError {
    /// Structured payload for display-layer error handling. Remote failures
    /// keep their original body under `body`; everything else carries a
    /// plain `message`.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            WorkbenchError::Store(StoreError::Remote { body, .. }) => json!({ "body": body }),
            WorkbenchError::Prompt(err) => match err.remote_body() {
                Some(body) => json!({ "body": body }),
                None => json!({ "message": self.to_string() }),
            },
            other => json!({ "message": other.to_string() }),
        }
    }
}

/// Best-effort extraction of a human-readable message from an error payload.
///
/// Precedence: a string at `body.message`, then a string at `message`, then
/// the stringified payload itself.
pub fn extract_error_message(error: &serde_json::Value) -> String {
    if let Some(message) = error.pointer("/body/message").and_then(|v| v.as_str()) {
        return message.to_string();
    }
    if let Some(message) = error.get("message").and_then(|v| v.as_str()) {
        return message.to_string();
    }
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_nested_body_message() {
        let error = json!({"body": {"message": "X"}});
        assert_eq!(extract_error_message(&error), "X");
    }

    #[test]
    fn falls_back_to_top_level_message() {
        let error = json!({"message": "Y"});
        assert_eq!(extract_error_message(&error), "Y");
    }

    #[test]
    fn nested_message_wins_over_top_level() {
        let error = json!({"body": {"message": "X"}, "message": "Y"});
        assert_eq!(extract_error_message(&error), "X");
    }

    #[test]
    fn stringifies_unknown_shapes() {
        let error = json!({"statusCode": 500, "detail": "boom"});
        assert_eq!(extract_error_message(&error), error.to_string());
    }

    #[test]
    fn non_string_message_is_not_extracted() {
        let error = json!({"message": 42});
        assert_eq!(extract_error_message(&error), error.to_string());
    }

    #[test]
    fn remote_store_error_keeps_body_in_payload() {
        let body = json!({"message": "duplicate approval"});
        let error = WorkbenchError::Store(StoreError::Remote {
            message: "conflict".to_string(),
            body: body.clone(),
        });
        assert_eq!(error.to_payload(), json!({"body": body}));
        assert_eq!(
            extract_error_message(&error.to_payload()),
            "duplicate approval"
        );
    }

    #[test]
    fn local_errors_carry_plain_message() {
        let error = WorkbenchError::EmptyPrompt;
        assert_eq!(
            error.to_payload(),
            json!({"message": "Prompt must not be empty"})
        );
    }
}
