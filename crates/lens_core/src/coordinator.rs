//! Analysis workflow coordinator.
//!
//! Drives the request lifecycle:
//! `Idle -> InFlight -> Succeeded | Failed`, re-entering `InFlight` on every
//! new submission. The outbound call is the only await point; the move to
//! `InFlight` is published before it, so subscribers can show a busy state
//! while the call is outstanding.

use crate::models::{AnalysisRequest, RequestId, WorkflowState};
use crate::services::AnalysisTransport;
use crate::state::LensState;

use std::sync::Arc;
use std::time::Instant;

/// What a call to [`AnalysisCoordinator::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Submission was gated (blank query or a call already outstanding).
    Skipped,
    /// The call finished and settled the workflow state.
    Settled {
        /// Id of the call.
        request_id: RequestId,
        /// Whether the result was a success.
        succeeded: bool,
    },
    /// The call finished after a newer one took over; its response was dropped.
    Superseded {
        /// Id of the dropped call.
        request_id: RequestId,
    },
}

impl SubmitOutcome {
    /// Check if an outbound call was issued.
    pub fn was_submitted(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Owns the workflow state machine for one session.
#[derive(Clone)]
pub struct AnalysisCoordinator {
    state: Arc<LensState>,
    transport: Arc<dyn AnalysisTransport>,
}

impl AnalysisCoordinator {
    /// Create a coordinator over injected session state and transport.
    pub fn new(state: Arc<LensState>, transport: Arc<dyn AnalysisTransport>) -> Self {
        Self { state, transport }
    }

    /// Get the session state.
    pub fn state(&self) -> &Arc<LensState> {
        &self.state
    }

    /// Submit the current draft for analysis.
    ///
    /// No-op unless [`LensState::can_submit`] holds. Otherwise the state moves
    /// to `InFlight`, one request is sent, and the response settles the state.
    /// Failures never escape: they become `Failed(message)`.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some((request_id, request)) = self.begin() else {
            return SubmitOutcome::Skipped;
        };

        let start = Instant::now();
        let outcome = self.transport.analyze(&request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let next = match outcome {
            Ok(result) => {
                tracing::debug!(
                    request_id,
                    elapsed_ms,
                    issues = result.issue_count(),
                    "Analysis succeeded"
                );
                WorkflowState::Succeeded(result)
            }
            Err(error) => {
                tracing::warn!(
                    request_id,
                    elapsed_ms,
                    category = error.category(),
                    answered = error.is_service_response(),
                    error = %error,
                    "Analysis failed"
                );
                WorkflowState::Failed(error.failure_message())
            }
        };

        let succeeded = matches!(next, WorkflowState::Succeeded(_));
        if self.state.settle(request_id, next) {
            SubmitOutcome::Settled { request_id, succeeded }
        } else {
            tracing::debug!(request_id, "Dropping response for superseded request");
            SubmitOutcome::Superseded { request_id }
        }
    }

    /// Spawn [`submit`](Self::submit) on the current tokio runtime.
    ///
    /// The `InFlight` transition is visible once the task starts; callers
    /// that need it immediately should await `submit` instead.
    pub fn spawn_submit(&self) -> tokio::task::JoinHandle<SubmitOutcome> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.submit().await })
    }

    /// Check the gate and move to `InFlight`, returning the request to send.
    fn begin(&self) -> Option<(RequestId, AnalysisRequest)> {
        if !self.state.draft().has_query() {
            tracing::trace!("Submission gated: query is blank");
            return None;
        }

        let request = self.state.build_request();
        let Some(request_id) = self.state.try_begin() else {
            tracing::trace!("Submission gated: analysis already in flight");
            return None;
        };

        tracing::debug!(
            request_id,
            transport = self.transport.name(),
            db_type = %request.db_type,
            "Analysis submitted"
        );
        Some((request_id, request))
    }
}

impl std::fmt::Debug for AnalysisCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCoordinator")
            .field("state", &self.state)
            .field("transport", &self.transport.name())
            .finish()
    }
}
