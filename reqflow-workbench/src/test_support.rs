use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqflow_llm::PromptError;
use shared_types::{BaStatus, CreateRequirementRequest, Requirement};

use crate::notify::ChangeNotifier;
use crate::prompts::PromptService;
use crate::store::{RequirementStore, StoreError};

pub(crate) fn requirement_with(
    ba_status: BaStatus,
    technical_solution: Option<String>,
) -> Requirement {
    let mut requirement = Requirement::new(
        "Sync invoices between billing and the data warehouse".to_string(),
        Some("REQ-101".to_string()),
    );
    requirement.ba_status = ba_status;
    requirement.technical_solution = technical_solution;
    requirement
}

/// In-memory store double tracking write calls.
pub(crate) struct TestStore {
    requirement: Mutex<Requirement>,
    fail_next: Mutex<Option<serde_json::Value>>,
    last_verbatim: Mutex<Option<bool>>,
    pub approve_design_calls: AtomicUsize,
    pub approve_ba_calls: AtomicUsize,
}

impl TestStore {
    pub fn new(requirement: Requirement) -> Arc<Self> {
        Arc::new(Self {
            requirement: Mutex::new(requirement),
            fail_next: Mutex::new(None),
            last_verbatim: Mutex::new(None),
            approve_design_calls: AtomicUsize::new(0),
            approve_ba_calls: AtomicUsize::new(0),
        })
    }

    pub fn requirement_id(&self) -> String {
        self.requirement.lock().unwrap().id.clone()
    }

    pub fn fail_next_with_remote_body(&self, body: serde_json::Value) {
        *self.fail_next.lock().unwrap() = Some(body);
    }

    pub fn last_verbatim_flag(&self) -> Option<bool> {
        *self.last_verbatim.lock().unwrap()
    }

    fn take_failure(&self) -> Option<StoreError> {
        self.fail_next
            .lock()
            .unwrap()
            .take()
            .map(|body| StoreError::Remote {
                message: "remote failure".to_string(),
                body,
            })
    }
}

#[async_trait]
impl RequirementStore for TestStore {
    async fn create_requirement(
        &self,
        request: CreateRequirementRequest,
    ) -> Result<Requirement, StoreError> {
        Ok(Requirement::new(request.description, request.source_key))
    }

    async fn list_requirements(&self) -> Result<Vec<Requirement>, StoreError> {
        Ok(vec![self.requirement.lock().unwrap().clone()])
    }

    async fn get_requirement(&self, record_id: &str) -> Result<Requirement, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let requirement = self.requirement.lock().unwrap();
        if requirement.id != record_id {
            return Err(StoreError::NotFound(record_id.to_string()));
        }
        Ok(requirement.clone())
    }

    async fn approve_design(
        &self,
        record_id: &str,
        prompt: &str,
        response: &str,
    ) -> Result<Requirement, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.approve_design_calls.fetch_add(1, Ordering::SeqCst);
        let mut requirement = self.requirement.lock().unwrap();
        if requirement.id != record_id {
            return Err(StoreError::NotFound(record_id.to_string()));
        }
        requirement.ta_prompt = Some(prompt.to_string());
        requirement.technical_solution = Some(response.to_string());
        requirement.updated_at += 1;
        Ok(requirement.clone())
    }

    async fn approve_ba_content(
        &self,
        record_id: &str,
        used_ai_verbatim: bool,
        content: &str,
        prompt: &str,
    ) -> Result<Requirement, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.approve_ba_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_verbatim.lock().unwrap() = Some(used_ai_verbatim);
        let mut requirement = self.requirement.lock().unwrap();
        if requirement.id != record_id {
            return Err(StoreError::NotFound(record_id.to_string()));
        }
        requirement.ba_status = BaStatus::Approved;
        requirement.ba_prompt = Some(prompt.to_string());
        requirement.ba_response = Some(content.to_string());
        requirement.updated_at += 1;
        Ok(requirement.clone())
    }
}

/// Prompt-service double with call counters and an optional gate that
/// blocks the next call until released.
pub(crate) struct TestPrompts {
    answer: String,
    fail: bool,
    gate: Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
    pub generate_calls: AtomicUsize,
    pub ask_calls: AtomicUsize,
}

impl TestPrompts {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            fail: false,
            gate: Mutex::new(None),
            generate_calls: AtomicUsize::new(0),
            ask_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: String::new(),
            fail: true,
            gate: Mutex::new(None),
            generate_calls: AtomicUsize::new(0),
            ask_calls: AtomicUsize::new(0),
        })
    }

    pub fn block_next_on(&self, gate: tokio::sync::oneshot::Receiver<()>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    async fn answer(&self) -> Result<String, PromptError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.await.ok();
        }
        if self.fail {
            return Err(PromptError::api_error(
                500,
                "ai exploded".to_string(),
                Some(serde_json::json!({"message": "ai exploded"})),
            ));
        }
        Ok(self.answer.clone())
    }
}

#[async_trait]
impl PromptService for TestPrompts {
    async fn generate_draft_solution(
        &self,
        _requirement: &Requirement,
    ) -> Result<String, PromptError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().await
    }

    async fn ask_clarifying_question(
        &self,
        _requirement: &Requirement,
        _question: &str,
    ) -> Result<String, PromptError> {
        self.ask_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().await
    }

    async fn ask_ai(
        &self,
        _requirement: &Requirement,
        _prompt: &str,
    ) -> Result<String, PromptError> {
        self.ask_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().await
    }
}

pub(crate) struct RecordingNotifier {
    ids: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ids: Mutex::new(Vec::new()),
        })
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn record_changed(&self, record_id: &str) {
        self.ids.lock().unwrap().push(record_id.to_string());
    }
}
