//! Analysis result models returned by the service.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize a field the service owns, falling back to the default when the
/// value is `null` or has an unexpected type.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// How urgent a suggestion is, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must fix
    Critical,
    /// Should fix
    High,
    /// Worth a look
    Medium,
    /// Cosmetic
    Low,
    /// Missing or unrecognized value
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }
}

/// A single optimization suggestion.
///
/// The service owns the contents. A missing, `null` or mistyped field reads
/// as its default and never fails the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationSuggestion {
    /// Kind of finding, e.g. `index_missing` or `query_rewrite`.
    #[serde(rename = "type", deserialize_with = "or_default")]
    pub kind: String,
    /// Reported severity.
    #[serde(deserialize_with = "or_default")]
    pub severity: Severity,
    /// What to change.
    #[serde(deserialize_with = "or_default")]
    pub suggestion: String,
    /// Why it matters.
    #[serde(deserialize_with = "or_default")]
    pub reason: String,
    /// Expected gain, e.g. "40% faster".
    #[serde(deserialize_with = "or_default")]
    pub estimated_improvement: String,
}

/// Execution plan produced by the service.
///
/// Read as leniently as [`OptimizationSuggestion`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionPlan {
    /// Planner name or plan kind.
    #[serde(deserialize_with = "or_default")]
    pub plan_type: String,
    /// Plan operations, opaque to the client.
    #[serde(deserialize_with = "or_default")]
    pub operations: Vec<Value>,
    /// Estimated total cost.
    #[serde(deserialize_with = "or_default")]
    pub total_cost: f64,
    /// Estimated row count; planners report it as a float.
    #[serde(deserialize_with = "or_default")]
    pub estimated_rows: f64,
}

/// Successful response of `POST /analyze`.
///
/// `analysis_time_ms`, `readability_score`, `optimization_suggestions` and
/// `security_issues` are required; a body without them does not deserialize.
/// The optional fields read as absent when they are `null` or mistyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Server-side analysis duration.
    pub analysis_time_ms: f64,
    /// Readability, nominally 0 to 100.
    pub readability_score: f64,
    /// Suggestions in service order.
    pub optimization_suggestions: Vec<OptimizationSuggestion>,
    /// Rewritten query, if one was produced.
    #[serde(default, deserialize_with = "or_default")]
    pub optimized_query: Option<String>,
    /// Execution plan, if one was produced.
    #[serde(default, deserialize_with = "or_default")]
    pub execution_plan: Option<ExecutionPlan>,
    /// Security findings, possibly empty.
    pub security_issues: Vec<String>,
    /// Echo of the analyzed query.
    #[serde(default, deserialize_with = "or_default")]
    pub query: Option<String>,
    /// Parser output.
    #[serde(default, deserialize_with = "or_default")]
    pub parsed_query: Option<Map<String, Value>>,
    /// Extra metrics such as `complexity_score` and `subqueries`.
    #[serde(default, deserialize_with = "or_default")]
    pub performance_metrics: Option<Map<String, Value>>,
}

impl AnalysisResult {
    /// Number of issues found.
    pub fn issue_count(&self) -> usize {
        self.optimization_suggestions.len()
    }

    /// Check if the service reported any security issue.
    pub fn has_security_issues(&self) -> bool {
        !self.security_issues.is_empty()
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Service status, "healthy" when up.
    pub status: String,
    /// Service name.
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    /// Check if the service reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
