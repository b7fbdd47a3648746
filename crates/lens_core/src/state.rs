//! Session state shared by the coordinator and renderers.
//!
//! One `LensState` exists per session and is injected wherever it is needed.
//! It holds the query draft (the input collector) and the single workflow
//! state cell. The coordinator is the only writer of the workflow state;
//! renderers read it or subscribe to its changes.

use crate::models::{AnalysisRequest, Dialect, QueryDraft, RequestId, WorkflowState};

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Central session state.
pub struct LensState {
    /// Query being edited
    draft: RwLock<QueryDraft>,
    /// Current workflow state; the channel notifies subscribers on change
    workflow: watch::Sender<WorkflowState>,
    /// Last issued request id
    last_request_id: AtomicU64,
}

impl LensState {
    /// Create session state with an empty draft and an idle workflow.
    pub fn new() -> Self {
        Self::with_draft(QueryDraft::default())
    }

    /// Create session state starting from the given draft.
    pub fn with_draft(draft: QueryDraft) -> Self {
        let (workflow, _) = watch::channel(WorkflowState::Idle);
        Self { draft: RwLock::new(draft), workflow, last_request_id: AtomicU64::new(0) }
    }

    // ========== Input Collector ==========

    /// Replace the query text. No trimming or validation.
    pub fn set_text(&self, text: impl Into<String>) {
        self.draft.write().text = text.into();
    }

    /// Append a line to the query text.
    pub fn push_line(&self, line: &str) {
        let mut draft = self.draft.write();
        if !draft.text.is_empty() {
            draft.text.push('\n');
        }
        draft.text.push_str(line);
    }

    /// Replace the selected dialect.
    pub fn set_dialect(&self, dialect: Dialect) {
        tracing::debug!(dialect = %dialect, "Dialect changed");
        self.draft.write().dialect = dialect;
    }

    /// Replace the schema context sent with requests.
    pub fn set_schema_info(&self, schema_info: Option<String>) {
        self.draft.write().schema_info = schema_info;
    }

    /// Get a copy of the current draft.
    pub fn draft(&self) -> QueryDraft {
        self.draft.read().clone()
    }

    /// Check whether the analyze action is enabled.
    ///
    /// True when the text is not blank and no call is outstanding.
    pub fn can_submit(&self) -> bool {
        self.draft.read().has_query() && !self.workflow.borrow().is_in_flight()
    }

    /// Snapshot the draft into a request.
    ///
    /// Callers check [`can_submit`](Self::can_submit) first.
    pub fn build_request(&self) -> AnalysisRequest {
        self.draft.read().to_request()
    }

    // ========== Workflow State ==========

    /// Get a copy of the current workflow state.
    pub fn workflow(&self) -> WorkflowState {
        self.workflow.borrow().clone()
    }

    /// Run a closure against the current workflow state without cloning it.
    pub fn with_workflow<R>(&self, f: impl FnOnce(&WorkflowState) -> R) -> R {
        f(&self.workflow.borrow())
    }

    /// Subscribe to workflow state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.workflow.subscribe()
    }

    /// Last request id handed out, 0 before the first submission.
    pub fn last_request_id(&self) -> RequestId {
        self.last_request_id.load(Ordering::SeqCst)
    }

    /// Move to `InFlight` unless a call is already outstanding.
    ///
    /// The check and the write happen under the channel's lock, so two racing
    /// callers cannot both start a call. Returns the new request id.
    pub(crate) fn try_begin(&self) -> Option<RequestId> {
        let mut issued = None;
        self.workflow.send_if_modified(|state| {
            if state.is_in_flight() {
                return false;
            }
            let request_id = self.last_request_id.fetch_add(1, Ordering::SeqCst) + 1;
            *state = WorkflowState::InFlight { request_id };
            issued = Some(request_id);
            true
        });
        issued
    }

    /// Settle the call `request_id` with `next`.
    ///
    /// Ignored unless the state is still waiting on that exact request.
    pub(crate) fn settle(&self, request_id: RequestId, next: WorkflowState) -> bool {
        self.workflow.send_if_modified(|state| {
            if !state.is_awaiting(request_id) {
                return false;
            }
            *state = next;
            true
        })
    }
}

impl Default for LensState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LensState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LensState")
            .field("dialect", &self.draft.read().dialect)
            .field("workflow", &self.workflow.borrow().name())
            .field("last_request_id", &self.last_request_id())
            .finish()
    }
}
