use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use shared_types::{BaStatus, Requirement};

use crate::error::{extract_error_message, WorkbenchError};
use crate::guard::InFlightGuard;
use crate::notify::ChangeNotifier;
use crate::prompts::PromptService;
use crate::store::RequirementStore;

#[derive(Default)]
struct BaState {
    record: Option<Requirement>,
    prompt: String,
    response: String,
    last_error: Option<String>,
}

/// Business-analyst workbench over one requirement record.
///
/// Unlike the architect side there is no auto-generation: loading only
/// mirrors the persisted prompt/response pair into the working state.
pub struct BaWorkbench {
    record_id: String,
    store: Arc<dyn RequirementStore>,
    ai: Arc<dyn PromptService>,
    notifier: Arc<dyn ChangeNotifier>,
    state: Mutex<BaState>,
    in_flight: AtomicBool,
}

impl BaWorkbench {
    pub fn new(
        record_id: impl Into<String>,
        store: Arc<dyn RequirementStore>,
        ai: Arc<dyn PromptService>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            store,
            ai,
            notifier,
            state: Mutex::new(BaState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, BaState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    pub fn record(&self) -> Option<Requirement> {
        self.state().record.clone()
    }

    pub fn prompt(&self) -> String {
        self.state().prompt.clone()
    }

    pub fn response(&self) -> String {
        self.state().response.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.state().prompt = prompt.into();
    }

    pub fn set_response(&self, response: impl Into<String>) {
        self.state().response = response.into();
    }

    /// Current BA review stage; `Draft` before the record is loaded.
    pub fn status(&self) -> BaStatus {
        self.state()
            .record
            .as_ref()
            .map(|record| record.ba_status)
            .unwrap_or(BaStatus::Draft)
    }

    /// BA failures surface the extracted human-readable message.
    fn record_failure(&self, err: WorkbenchError) -> WorkbenchError {
        let message = extract_error_message(&err.to_payload());
        tracing::error!(record_id = %self.record_id, error = %message, "BA workbench operation failed");
        self.state().last_error = Some(message);
        err
    }

    /// Mount the workbench: fetch the record and mirror the persisted
    /// prompt/response into the working fields.
    pub async fn load(&self) -> Result<Requirement, WorkbenchError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let record = match self.store.get_requirement(&self.record_id).await {
            Ok(record) => record,
            Err(err) => return Err(self.record_failure(err.into())),
        };

        let mut state = self.state();
        state.prompt = record.ba_prompt.clone().unwrap_or_default();
        state.response = record.ba_response.clone().unwrap_or_default();
        state.record = Some(record.clone());
        drop(state);

        Ok(record)
    }

    /// Ask the AI service for business content and replace the working
    /// response with the answer. Empty prompts never reach the service.
    pub async fn ask_ai(&self, prompt: &str) -> Result<String, WorkbenchError> {
        if prompt.trim().is_empty() {
            return Err(WorkbenchError::EmptyPrompt);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let record = self
            .state()
            .record
            .clone()
            .ok_or(WorkbenchError::NotLoaded)?;

        match self.ai.ask_ai(&record, prompt).await {
            Ok(answer) => {
                let mut state = self.state();
                state.prompt = prompt.to_string();
                state.response = answer.clone();
                Ok(answer)
            }
            Err(err) => Err(self.record_failure(err.into())),
        }
    }

    /// Persist the working prompt/response as approved BA content and
    /// unlock the architect stage. The content is always submitted as
    /// manually curated (`used_ai_verbatim = false`).
    pub async fn approve(&self) -> Result<Requirement, WorkbenchError> {
        let (prompt, response) = {
            let state = self.state();
            (state.prompt.clone(), state.response.clone())
        };

        if response.trim().is_empty() {
            return Err(WorkbenchError::EmptyResponse);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        match self
            .store
            .approve_ba_content(&self.record_id, false, &response, &prompt)
            .await
        {
            Ok(updated) => {
                self.state().record = Some(updated.clone());
                self.notifier.record_changed(&self.record_id);
                tracing::info!(record_id = %self.record_id, "BA content approved, architect stage unlocked");
                Ok(updated)
            }
            Err(err) => Err(self.record_failure(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{requirement_with, RecordingNotifier, TestPrompts, TestStore};
    use std::sync::atomic::Ordering;

    fn workbench(
        store: Arc<TestStore>,
        prompts: Arc<TestPrompts>,
        notifier: Arc<RecordingNotifier>,
    ) -> BaWorkbench {
        let id = store.requirement_id();
        BaWorkbench::new(id, store, prompts, notifier)
    }

    #[tokio::test]
    async fn load_mirrors_persisted_fields_without_generation() {
        let mut requirement = requirement_with(BaStatus::InReview, None);
        requirement.ba_prompt = Some("summarize the change".to_string());
        requirement.ba_response = Some("the change affects billing".to_string());
        let store = TestStore::new(requirement);
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts.clone(), notifier);

        wb.load().await.unwrap();

        assert_eq!(wb.prompt(), "summarize the change");
        assert_eq!(wb.response(), "the change affects billing");
        assert_eq!(wb.status(), BaStatus::InReview);
        assert_eq!(prompts.generate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(prompts.ask_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_prompt_never_reaches_the_service() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts.clone(), notifier);
        wb.load().await.unwrap();

        let result = wb.ask_ai("").await;

        assert!(matches!(result, Err(WorkbenchError::EmptyPrompt)));
        assert_eq!(prompts.ask_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ask_ai_replaces_the_working_response() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::answering("billing is settled nightly");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts, notifier);
        wb.load().await.unwrap();

        let answer = wb.ask_ai("how is billing settled?").await.unwrap();

        assert_eq!(answer, "billing is settled nightly");
        assert_eq!(wb.prompt(), "how is billing settled?");
        assert_eq!(wb.response(), "billing is settled nightly");
    }

    #[tokio::test]
    async fn ai_failure_surfaces_the_extracted_message() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::failing();
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts, notifier);
        wb.load().await.unwrap();

        let result = wb.ask_ai("anything").await;

        assert!(result.is_err());
        assert_eq!(wb.last_error().as_deref(), Some("ai exploded"));
    }

    #[tokio::test]
    async fn approve_rejects_empty_response_before_any_store_call() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store.clone(), prompts, notifier);
        wb.load().await.unwrap();

        let result = wb.approve().await;

        assert!(matches!(result, Err(WorkbenchError::EmptyResponse)));
        assert_eq!(store.approve_ba_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn approve_persists_content_and_notifies() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store.clone(), prompts, notifier.clone());
        let record_id = store.requirement_id();

        wb.load().await.unwrap();
        wb.set_prompt("capture billing scope");
        wb.set_response("billing scope captured");

        let updated = wb.approve().await.unwrap();

        assert_eq!(store.approve_ba_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.last_verbatim_flag(), Some(false));
        assert_eq!(updated.ba_status, BaStatus::Approved);
        assert_eq!(updated.ba_prompt.as_deref(), Some("capture billing scope"));
        assert_eq!(updated.ba_response.as_deref(), Some("billing scope captured"));
        assert_eq!(notifier.ids(), vec![record_id]);
    }

    #[tokio::test]
    async fn store_failure_surfaces_the_extracted_message() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        store.fail_next_with_remote_body(serde_json::json!({"message": "insufficient access"}));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts, notifier.clone());

        let result = wb.load().await;

        assert!(result.is_err());
        assert_eq!(wb.last_error().as_deref(), Some("insufficient access"));
        assert!(notifier.ids().is_empty());
    }
}
