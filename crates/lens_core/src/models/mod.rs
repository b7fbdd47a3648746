//! Data models for Lens.
//!
//! This module contains all core data structures:
//! - `draft` - QueryDraft, Dialect, AnalysisRequest
//! - `analysis` - AnalysisResult, OptimizationSuggestion, ExecutionPlan, HealthStatus
//! - `workflow` - WorkflowState

pub mod analysis;
pub mod draft;
pub mod workflow;

pub use analysis::{AnalysisResult, ExecutionPlan, HealthStatus, OptimizationSuggestion, Severity};
pub use draft::{AnalysisRequest, Dialect, QueryDraft, UnknownDialect, ANALYSIS_FOCUS};
pub use workflow::{RequestId, WorkflowState};
