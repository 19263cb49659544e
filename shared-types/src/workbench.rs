use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::Requirement;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct CreateRequirementRequest {
    pub description: String,
    pub source_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct RequirementListResponse {
    pub requirements: Vec<Requirement>,
}

/// What happened when the architect workbench mounted a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub enum LoadOutcome {
    /// A technical solution was already persisted and is shown as-is.
    ExistingSolution,
    /// No solution existed and the BA stage was approved, so a draft was
    /// generated during the load.
    DraftGenerated,
    /// Generation was attempted but the AI service failed; the working
    /// response stays empty.
    GenerationFailed,
    /// The BA stage is not approved yet; the workbench stays locked.
    AwaitingBaApproval,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct ArchitectLoadResponse {
    pub requirement: Requirement,
    pub response: String,
    pub outcome: LoadOutcome,
    pub locked: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct BaLoadResponse {
    pub requirement: Requirement,
    pub prompt: String,
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct AskQuestionRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct AskAiRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct ApproveDesignRequest {
    pub prompt: String,
    pub response: String,
    /// The caller's explicit confirmation of the approval dialog.
    pub confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct ApproveBaContentRequest {
    pub prompt: String,
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct AnswerResponse {
    pub answer: String,
}
