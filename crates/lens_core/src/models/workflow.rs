//! Analysis request lifecycle.

use super::AnalysisResult;

/// Identifier of one outbound analysis call, increasing per submission.
pub type RequestId = u64;

/// Where the current analysis stands.
///
/// `Idle` is only ever the initial state; once a submission happens the
/// machine cycles between `InFlight` and the two settled variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Waiting on the service.
    InFlight {
        /// The call whose response may settle this state.
        request_id: RequestId,
    },
    /// The service returned a result.
    Succeeded(AnalysisResult),
    /// The call failed; the message is shown inline.
    Failed(String),
}

impl WorkflowState {
    /// Check if a call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight { .. })
    }

    /// Check if the last call settled, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Check if the state is awaiting the given request.
    pub fn is_awaiting(&self, id: RequestId) -> bool {
        matches!(self, Self::InFlight { request_id } if *request_id == id)
    }

    /// Get the result if the last call succeeded.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// Get the error message if the last call failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight { .. } => "in_flight",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}
