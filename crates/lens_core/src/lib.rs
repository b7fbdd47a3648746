//! Core types and analysis workflow for the Lens SQL analysis client.
//!
//! This crate provides the client-side service layer:
//!
//! - **error**: Error handling for transport and service failures
//! - **config**: Service address and timeout settings
//! - **models**: Query draft, analysis request/result, workflow state
//! - **services**: HTTP client for the analysis service
//! - **state**: Session state (query draft and workflow state cell)
//! - **coordinator**: The request lifecycle state machine
//! - **logging**: Structured logging setup

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::ClientConfig;
pub use coordinator::{AnalysisCoordinator, SubmitOutcome};
pub use error::{ErrorInfo, LensError};
pub use models::{
    AnalysisRequest, AnalysisResult, Dialect, ExecutionPlan, HealthStatus, OptimizationSuggestion,
    QueryDraft, Severity, WorkflowState,
};
pub use services::{AnalysisClient, AnalysisTransport};
pub use state::LensState;
