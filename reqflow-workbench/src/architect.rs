use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use shared_types::{BaStatus, LoadOutcome, Requirement};

use crate::error::WorkbenchError;
use crate::guard::InFlightGuard;
use crate::notify::ChangeNotifier;
use crate::prompts::PromptService;
use crate::store::RequirementStore;

/// Decide whether mounting the architect workbench should generate a draft
/// technical solution. True exactly when the BA stage is approved and no
/// solution exists yet.
pub fn should_auto_generate(record: &Requirement) -> bool {
    record.ba_status == BaStatus::Approved && !record.has_technical_solution()
}

#[derive(Default)]
struct ArchitectState {
    record: Option<Requirement>,
    prompt: String,
    response: String,
    last_error: Option<String>,
}

/// Architect-side workbench over one requirement record.
///
/// Holds the read-write-through cached copy of the record plus the working
/// prompt/response pair. All I/O goes through the store/AI/notifier seams.
pub struct ArchitectWorkbench {
    record_id: String,
    store: Arc<dyn RequirementStore>,
    ai: Arc<dyn PromptService>,
    notifier: Arc<dyn ChangeNotifier>,
    state: Mutex<ArchitectState>,
    in_flight: AtomicBool,
}

impl ArchitectWorkbench {
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
            state: Mutex::new(ArchitectState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, ArchitectState> {
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

    /// Locked until the BA stage of the cached record is approved.
    pub fn is_locked(&self) -> bool {
        !matches!(
            &self.state().record,
            Some(record) if record.ba_status == BaStatus::Approved
        )
    }

    /// Architect failures keep the raw stringified error.
    fn record_failure(&self, err: WorkbenchError) -> WorkbenchError {
        self.state().last_error = Some(err.to_payload().to_string());
        err
    }

    /// Mount the workbench: fetch the record and decide what to show.
    ///
    /// An existing technical solution is displayed as-is. Otherwise, when
    /// `should_auto_generate` holds, a draft is generated during the load;
    /// a generation failure is non-fatal and leaves the response empty.
    pub async fn load(&self) -> Result<LoadOutcome, WorkbenchError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let record = match self.store.get_requirement(&self.record_id).await {
            Ok(record) => record,
            Err(err) => return Err(self.record_failure(err.into())),
        };

        {
            let mut state = self.state();
            state.record = Some(record.clone());
            state.prompt.clear();
        }

        if record.has_technical_solution() {
            self.state().response = record.technical_solution.clone().unwrap_or_default();
            return Ok(LoadOutcome::ExistingSolution);
        }

        if !should_auto_generate(&record) {
            self.state().response.clear();
            return Ok(LoadOutcome::AwaitingBaApproval);
        }

        tracing::info!(
            record_id = %self.record_id,
            "AI working: generating default technical solution"
        );
        match self.ai.generate_draft_solution(&record).await {
            Ok(draft) => {
                self.state().response = draft;
                Ok(LoadOutcome::DraftGenerated)
            }
            Err(err) => {
                tracing::warn!(record_id = %self.record_id, error = %err, "Draft generation failed");
                self.state().response.clear();
                Ok(LoadOutcome::GenerationFailed)
            }
        }
    }

    /// Refresh the cached record without any generation side effect.
    pub async fn load_record(&self) -> Result<Requirement, WorkbenchError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let record = match self.store.get_requirement(&self.record_id).await {
            Ok(record) => record,
            Err(err) => return Err(self.record_failure(err.into())),
        };
        self.state().record = Some(record.clone());
        Ok(record)
    }

    /// Send a clarifying question to the AI service and replace the working
    /// response with the answer. Empty questions never reach the service.
    pub async fn ask_clarifying_question(&self, question: &str) -> Result<String, WorkbenchError> {
        if question.trim().is_empty() {
            return Err(WorkbenchError::EmptyPrompt);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let record = self
            .state()
            .record
            .clone()
            .ok_or(WorkbenchError::NotLoaded)?;

        match self.ai.ask_clarifying_question(&record, question).await {
            Ok(answer) => {
                let mut state = self.state();
                state.prompt = question.to_string();
                state.response = answer.clone();
                Ok(answer)
            }
            Err(err) => Err(self.record_failure(err.into())),
        }
    }

    /// Persist the working prompt/response as the approved technical
    /// solution. Requires a non-empty response, explicit confirmation, and
    /// an unlocked record; emits a record-change notification on success.
    pub async fn approve(&self, confirmed: bool) -> Result<Requirement, WorkbenchError> {
        let (prompt, response) = {
            let state = self.state();
            (state.prompt.clone(), state.response.clone())
        };

        if response.trim().is_empty() {
            return Err(WorkbenchError::EmptyResponse);
        }
        if !confirmed {
            return Err(WorkbenchError::NotConfirmed);
        }
        if self.is_locked() {
            return Err(WorkbenchError::Locked);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        match self
            .store
            .approve_design(&self.record_id, &prompt, &response)
            .await
        {
            Ok(updated) => {
                self.state().record = Some(updated.clone());
                self.notifier.record_changed(&self.record_id);
                tracing::info!(record_id = %self.record_id, "Technical solution approved");
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
    ) -> ArchitectWorkbench {
        let id = store.requirement_id();
        ArchitectWorkbench::new(id, store, prompts, notifier)
    }

    #[test]
    fn auto_generation_decision() {
        let approved_empty = requirement_with(BaStatus::Approved, None);
        assert!(should_auto_generate(&approved_empty));

        let approved_with_solution =
            requirement_with(BaStatus::Approved, Some("use a queue".to_string()));
        assert!(!should_auto_generate(&approved_with_solution));

        let draft_empty = requirement_with(BaStatus::Draft, None);
        assert!(!should_auto_generate(&draft_empty));
    }

    #[tokio::test]
    async fn load_generates_draft_exactly_once_when_unlocked_and_empty() {
        let store = TestStore::new(requirement_with(BaStatus::Approved, None));
        let prompts = TestPrompts::answering("draft solution");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts.clone(), notifier);

        let outcome = wb.load().await.unwrap();

        assert_eq!(outcome, LoadOutcome::DraftGenerated);
        assert_eq!(prompts.generate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(wb.response(), "draft solution");
        assert!(!wb.is_locked());
    }

    #[tokio::test]
    async fn load_never_generates_when_solution_exists() {
        for status in [BaStatus::Draft, BaStatus::Approved] {
            let store = TestStore::new(requirement_with(status, Some("existing".to_string())));
            let prompts = TestPrompts::answering("unused");
            let notifier = RecordingNotifier::new();
            let wb = workbench(store, prompts.clone(), notifier);

            let outcome = wb.load().await.unwrap();

            assert_eq!(outcome, LoadOutcome::ExistingSolution);
            assert_eq!(prompts.generate_calls.load(Ordering::SeqCst), 0);
            assert_eq!(wb.response(), "existing");
        }
    }

    #[tokio::test]
    async fn load_stays_pending_until_ba_approval() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts.clone(), notifier);

        let outcome = wb.load().await.unwrap();

        assert_eq!(outcome, LoadOutcome::AwaitingBaApproval);
        assert_eq!(prompts.generate_calls.load(Ordering::SeqCst), 0);
        assert!(wb.response().is_empty());
        assert!(wb.is_locked());
    }

    #[tokio::test]
    async fn generation_failure_is_not_fatal() {
        let store = TestStore::new(requirement_with(BaStatus::Approved, None));
        let prompts = TestPrompts::failing();
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts.clone(), notifier);

        let outcome = wb.load().await.unwrap();

        assert_eq!(outcome, LoadOutcome::GenerationFailed);
        assert_eq!(prompts.generate_calls.load(Ordering::SeqCst), 1);
        assert!(wb.response().is_empty());
    }

    #[tokio::test]
    async fn empty_question_never_reaches_the_service() {
        let store = TestStore::new(requirement_with(BaStatus::Approved, None));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts.clone(), notifier);
        wb.load().await.unwrap();
        prompts.generate_calls.store(0, Ordering::SeqCst);

        let result = wb.ask_clarifying_question("   ").await;

        assert!(matches!(result, Err(WorkbenchError::EmptyPrompt)));
        assert_eq!(prompts.ask_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn clarifying_question_replaces_the_response() {
        let store = TestStore::new(requirement_with(
            BaStatus::Approved,
            Some("existing".to_string()),
        ));
        let prompts = TestPrompts::answering("because of the nightly batch");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts, notifier);
        wb.load().await.unwrap();

        let answer = wb.ask_clarifying_question("why nightly?").await.unwrap();

        assert_eq!(answer, "because of the nightly batch");
        assert_eq!(wb.prompt(), "why nightly?");
        assert_eq!(wb.response(), "because of the nightly batch");
    }

    #[tokio::test]
    async fn approve_requires_response_confirmation_and_unlock() {
        let store = TestStore::new(requirement_with(BaStatus::Draft, None));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store.clone(), prompts, notifier);
        wb.load().await.unwrap();

        // Empty response: rejected before any store call.
        assert!(matches!(
            wb.approve(true).await,
            Err(WorkbenchError::EmptyResponse)
        ));

        // Unconfirmed: rejected.
        wb.set_response("a solution");
        assert!(matches!(
            wb.approve(false).await,
            Err(WorkbenchError::NotConfirmed)
        ));

        // Locked record: rejected, still no store write.
        assert!(matches!(wb.approve(true).await, Err(WorkbenchError::Locked)));
        assert_eq!(store.approve_design_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn approve_persists_and_notifies_with_the_record_id() {
        let store = TestStore::new(requirement_with(BaStatus::Approved, None));
        let prompts = TestPrompts::answering("draft");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store.clone(), prompts, notifier.clone());
        let record_id = store.requirement_id();

        wb.load().await.unwrap();
        wb.set_prompt("make it resilient");
        wb.set_response("use an outbox table");

        let updated = wb.approve(true).await.unwrap();

        assert_eq!(store.approve_design_calls.load(Ordering::SeqCst), 1);
        assert_eq!(updated.ta_prompt.as_deref(), Some("make it resilient"));
        assert_eq!(
            updated.technical_solution.as_deref(),
            Some("use an outbox table")
        );
        assert_eq!(notifier.ids(), vec![record_id]);
    }

    #[tokio::test]
    async fn failures_are_kept_as_raw_stringified_errors() {
        let store = TestStore::new(requirement_with(BaStatus::Approved, None));
        store.fail_next_with_remote_body(serde_json::json!({"message": "row locked"}));
        let prompts = TestPrompts::answering("unused");
        let notifier = RecordingNotifier::new();
        let wb = workbench(store, prompts, notifier);

        let result = wb.load().await;

        assert!(result.is_err());
        let raw = wb.last_error().unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"body": {"message": "row locked"}}).to_string()
        );
    }

    #[tokio::test]
    async fn concurrent_operation_is_rejected_as_busy() {
        let store = TestStore::new(requirement_with(
            BaStatus::Approved,
            Some("existing".to_string()),
        ));
        let prompts = TestPrompts::answering("slow answer");
        let (gate_tx, gate_rx) = tokio::sync::oneshot::channel();
        prompts.block_next_on(gate_rx);
        let notifier = RecordingNotifier::new();
        let wb = Arc::new(workbench(store, prompts, notifier));
        wb.load().await.unwrap();

        let background = {
            let wb = Arc::clone(&wb);
            tokio::spawn(async move { wb.ask_clarifying_question("slow question").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(matches!(
            wb.ask_clarifying_question("second question").await,
            Err(WorkbenchError::Busy)
        ));

        gate_tx.send(()).ok();
        let first = background.await.unwrap();
        assert_eq!(first.unwrap(), "slow answer");

        // Guard released: the workbench is usable again.
        assert!(wb.ask_clarifying_question("third question").await.is_ok());
    }
}
