//! Plain-text rendering of result sections for a terminal.

use std::fmt::Write;

use lens_core::{ExecutionPlan, OptimizationSuggestion, WorkflowState};
use serde_json::Value;

use crate::sections::{select_sections, Section, SummaryMetrics};

/// Line shown while an analysis is outstanding.
pub const BUSY_LINE: &str = "Analyzing...";

/// Text shown when a successful analysis produced no suggestions.
pub const NO_SUGGESTIONS: &str = "No optimization suggestions. The query looks good.";

/// Render the full view for a workflow state.
pub fn render_state(state: &WorkflowState) -> String {
    match state {
        WorkflowState::InFlight { .. } => format!("{BUSY_LINE}\n"),
        _ => render_sections(&select_sections(state)),
    }
}

/// Render sections in order, separated by blank lines.
pub fn render_sections(sections: &[Section<'_>]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_section(&mut out, section);
    }
    out
}

fn render_section(out: &mut String, section: &Section<'_>) {
    match section {
        Section::ErrorNotice(message) => {
            let _ = writeln!(out, "! {message}");
        }
        Section::Summary(summary) => render_summary(out, summary),
        Section::Suggestions(suggestions) => {
            heading(out, section.title());
            render_suggestions(out, suggestions);
        }
        Section::OptimizedQuery(query) => {
            heading(out, section.title());
            for line in query.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
        Section::ExecutionPlan(plan) => {
            heading(out, section.title());
            render_plan(out, plan);
        }
        Section::SecurityIssues(issues) => {
            heading(out, section.title());
            for issue in issues.iter() {
                let _ = writeln!(out, "  \u{2022} {issue}");
            }
        }
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn render_summary(out: &mut String, summary: &SummaryMetrics) {
    let _ = writeln!(out, "Analysis Time:     {}", summary.analysis_time_label());
    let _ = writeln!(out, "Readability Score: {}", summary.readability_label());
    let _ = writeln!(out, "Issues Found:      {}", summary.issue_count_label());
}

fn render_suggestions(out: &mut String, suggestions: &[OptimizationSuggestion]) {
    if suggestions.is_empty() {
        let _ = writeln!(out, "{NO_SUGGESTIONS}");
        return;
    }

    for (i, s) in suggestions.iter().enumerate() {
        let kind = if s.kind.is_empty() { "suggestion" } else { s.kind.as_str() };
        let _ = writeln!(out, "{}. [{}] {}", i + 1, s.severity.label(), kind);
        if !s.suggestion.is_empty() {
            let _ = writeln!(out, "   {}", s.suggestion);
        }
        if !s.reason.is_empty() {
            let _ = writeln!(out, "   Reason: {}", s.reason);
        }
        if !s.estimated_improvement.is_empty() {
            let _ = writeln!(out, "   Estimated improvement: {}", s.estimated_improvement);
        }
    }
}

fn render_plan(out: &mut String, plan: &ExecutionPlan) {
    if !plan.plan_type.is_empty() {
        let _ = writeln!(out, "Type:           {}", plan.plan_type);
    }
    let _ = writeln!(out, "Total cost:     {:.2}", plan.total_cost);
    let _ = writeln!(out, "Estimated rows: {}", plan.estimated_rows);

    if plan.operations.is_empty() {
        return;
    }
    let _ = writeln!(out, "Operations:");
    for (i, op) in plan.operations.iter().enumerate() {
        let line = match op {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        let _ = writeln!(out, "  {}. {line}", i + 1);
    }
}
