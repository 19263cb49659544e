use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub mod workbench;

pub use workbench::{
    AnswerResponse, ApproveBaContentRequest, ApproveDesignRequest, ArchitectLoadResponse,
    AskAiRequest, AskQuestionRequest, BaLoadResponse, CreateRequirementRequest, LoadOutcome,
    RequirementListResponse,
};

// Shared models for the reqflow API and its workbench front-ends

/// Review stage of the business-analysis content on a requirement.
///
/// `Approved` unlocks the architect stage; everything else keeps the
/// technical solution read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub enum BaStatus {
    Draft,
    InReview,
    Approved,
}

impl BaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaStatus::Draft => "Draft",
            BaStatus::InReview => "InReview",
            BaStatus::Approved => "Approved",
        }
    }

    /// Parse a persisted status string. Unknown values fall back to `Draft`.
    pub fn parse(value: &str) -> Self {
        match value {
            "Approved" => BaStatus::Approved,
            "InReview" => BaStatus::InReview,
            _ => BaStatus::Draft,
        }
    }
}

impl std::fmt::Display for BaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The requirement record driving the review workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, TS)]
#[ts(export)]
pub struct Requirement {
    pub id: String,
    /// Key of the upstream tracker issue this requirement was imported from.
    pub source_key: Option<String>,
    pub description: String,
    pub ba_status: BaStatus,
    pub ba_prompt: Option<String>,
    pub ba_response: Option<String>,
    pub ta_prompt: Option<String>,
    pub technical_solution: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Requirement {
    pub fn new(description: String, source_key: Option<String>) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: Uuid::new_v4().to_string(),
            source_key,
            description,
            ba_status: BaStatus::Draft,
            ba_prompt: None,
            ba_response: None,
            ta_prompt: None,
            technical_solution: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once an approved or generated technical solution is present.
    pub fn has_technical_solution(&self) -> bool {
        self.technical_solution
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }

    /// Shortened description for list views. Appends an ellipsis when cut.
    pub fn description_preview(&self, max_chars: usize) -> String {
        if self.description.chars().count() <= max_chars {
            return self.description.clone();
        }
        let head: String = self.description.chars().take(max_chars).collect();
        format!("{head}…")
    }
}
