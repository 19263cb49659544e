use async_trait::async_trait;
use shared_types::{CreateRequirementRequest, Requirement};
use thiserror::Error;

/// Errors from the requirement persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Requirement not found: {0}")]
    NotFound(String),

    #[error("Store operation failed: {0}")]
    OperationFailed(String),

    /// A remote store rejected the call with a structured error body
    #[error("Remote store error: {message}")]
    Remote {
        message: String,
        body: serde_json::Value,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read/write access to the requirement entity.
///
/// Workbenches read a requirement on load and write it back only through
/// the two approve operations. Creation and listing exist for the callers
/// that play the persistence layer's lifecycle role.
#[async_trait]
pub trait RequirementStore: Send + Sync {
    async fn create_requirement(
        &self,
        request: CreateRequirementRequest,
    ) -> Result<Requirement, StoreError>;

    async fn list_requirements(&self) -> Result<Vec<Requirement>, StoreError>;

    async fn get_requirement(&self, record_id: &str) -> Result<Requirement, StoreError>;

    /// Persist the approved technical solution together with the prompt that
    /// produced it. Returns the refreshed record.
    async fn approve_design(
        &self,
        record_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<Requirement, StoreError>;

    /// Persist the approved business-analysis content and move `ba_status`
    /// to `Approved`. `used_ai_verbatim` records whether the AI answer was
    /// taken unedited. Returns the refreshed record.
    async fn approve_ba_content(
        &self,
        record_id: &str,
        used_ai_verbatim: bool,
        content: &str,
        prompt: &str,
    ) -> Result<Requirement, StoreError>;
}
