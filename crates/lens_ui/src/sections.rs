//! Result section selection.
//!
//! [`select_sections`] is a pure function of the workflow state. It decides
//! which parts of the result view are shown and in what order; formatting is
//! left to the caller.

use lens_core::{AnalysisResult, ExecutionPlan, OptimizationSuggestion, WorkflowState};

/// Always-shown metrics of a successful analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryMetrics {
    /// Server-side analysis duration.
    pub analysis_time_ms: f64,
    /// Readability score as reported.
    pub readability_score: f64,
    /// Number of optimization suggestions.
    pub issue_count: usize,
}

impl SummaryMetrics {
    /// Extract the metrics from a result.
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            analysis_time_ms: result.analysis_time_ms,
            readability_score: result.readability_score,
            issue_count: result.issue_count(),
        }
    }

    /// Analysis time with two decimals, e.g. `12.35ms`.
    pub fn analysis_time_label(&self) -> String {
        format!("{:.2}ms", self.analysis_time_ms)
    }

    /// Readability rounded to the nearest integer, e.g. `88%`.
    pub fn readability_label(&self) -> String {
        format!("{}%", self.readability_score.round() as i64)
    }

    /// Issue count as shown in the summary.
    pub fn issue_count_label(&self) -> String {
        self.issue_count.to_string()
    }
}

/// One unit of the result view.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<'a> {
    /// Inline error notice for a failed analysis.
    ErrorNotice(&'a str),
    /// Summary metrics.
    Summary(SummaryMetrics),
    /// Optimization suggestions, in service order. May be empty.
    Suggestions(&'a [OptimizationSuggestion]),
    /// The rewritten query.
    OptimizedQuery(&'a str),
    /// The execution plan.
    ExecutionPlan(&'a ExecutionPlan),
    /// Security findings; never empty.
    SecurityIssues(&'a [String]),
}

impl Section<'_> {
    /// Section kind, for tests and logs.
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::ErrorNotice(_) => SectionKind::ErrorNotice,
            Section::Summary(_) => SectionKind::Summary,
            Section::Suggestions(_) => SectionKind::Suggestions,
            Section::OptimizedQuery(_) => SectionKind::OptimizedQuery,
            Section::ExecutionPlan(_) => SectionKind::ExecutionPlan,
            Section::SecurityIssues(_) => SectionKind::SecurityIssues,
        }
    }

    /// Heading shown above the section.
    pub fn title(&self) -> &'static str {
        self.kind().title()
    }
}

/// Discriminant of [`Section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Error notice
    ErrorNotice,
    /// Summary metrics
    Summary,
    /// Optimization suggestions
    Suggestions,
    /// Optimized query
    OptimizedQuery,
    /// Execution plan
    ExecutionPlan,
    /// Security issues
    SecurityIssues,
}

impl SectionKind {
    /// Heading shown above the section.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::ErrorNotice => "Error",
            SectionKind::Summary => "Summary",
            SectionKind::Suggestions => "Optimization Suggestions",
            SectionKind::OptimizedQuery => "Optimized Query",
            SectionKind::ExecutionPlan => "Execution Plan",
            SectionKind::SecurityIssues => "Security Issues",
        }
    }
}

/// Select the sections to display for a workflow state.
///
/// - `Idle` and `InFlight` show nothing.
/// - `Failed` shows exactly one error notice.
/// - `Succeeded` shows the summary and suggestions, then the optimized query,
///   execution plan and security issues when they have content.
pub fn select_sections(state: &WorkflowState) -> Vec<Section<'_>> {
    match state {
        WorkflowState::Idle | WorkflowState::InFlight { .. } => Vec::new(),
        WorkflowState::Failed(message) => vec![Section::ErrorNotice(message)],
        WorkflowState::Succeeded(result) => result_sections(result),
    }
}

fn result_sections(result: &AnalysisResult) -> Vec<Section<'_>> {
    let mut sections = vec![
        Section::Summary(SummaryMetrics::from_result(result)),
        Section::Suggestions(&result.optimization_suggestions),
    ];

    if let Some(query) = &result.optimized_query {
        sections.push(Section::OptimizedQuery(query));
    }
    if let Some(plan) = &result.execution_plan {
        sections.push(Section::ExecutionPlan(plan));
    }
    if result.has_security_issues() {
        sections.push(Section::SecurityIssues(&result.security_issues));
    }

    sections
}
