//! Query draft and analysis request models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis focus sent with every request.
pub const ANALYSIS_FOCUS: &str = "performance";

/// Target SQL dialect of the query being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL (default)
    #[default]
    Postgresql,
    /// MySQL
    Mysql,
    /// SQLite
    Sqlite,
    /// Microsoft SQL Server
    Sqlserver,
}

impl Dialect {
    /// All dialects, in the order a picker lists them.
    pub const ALL: [Dialect; 4] =
        [Dialect::Postgresql, Dialect::Mysql, Dialect::Sqlite, Dialect::Sqlserver];

    /// Wire value used in the `db_type` request field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Sqlserver => "sqlserver",
        }
    }

    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Postgresql => "PostgreSQL",
            Dialect::Mysql => "MySQL",
            Dialect::Sqlite => "SQLite",
            Dialect::Sqlserver => "SQL Server",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a dialect name is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected postgresql, mysql, sqlite or sqlserver)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            "mysql" => Ok(Dialect::Mysql),
            "sqlite" => Ok(Dialect::Sqlite),
            "sqlserver" | "mssql" => Ok(Dialect::Sqlserver),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

/// The query being edited, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDraft {
    /// Raw SQL text; never trimmed or validated.
    pub text: String,
    /// Selected dialect.
    pub dialect: Dialect,
    /// Optional schema DDL forwarded as context.
    pub schema_info: Option<String>,
}

impl QueryDraft {
    /// Create a draft with the given text and dialect.
    pub fn new(text: impl Into<String>, dialect: Dialect) -> Self {
        Self { text: text.into(), dialect, schema_info: None }
    }

    /// Check if the text contains anything besides whitespace.
    pub fn has_query(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Snapshot the draft into a request body.
    pub fn to_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            query: self.text.clone(),
            db_type: self.dialect,
            focus: ANALYSIS_FOCUS.to_string(),
            schema_info: self.schema_info.clone(),
        }
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// SQL text at submission time.
    pub query: String,
    /// Dialect at submission time.
    pub db_type: Dialect,
    /// Always [`ANALYSIS_FOCUS`].
    pub focus: String,
    /// Schema DDL, omitted from the body when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_info: Option<String>,
}

impl AnalysisRequest {
    /// Leading part of the query for log output.
    pub fn query_preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.query.chars().take(max_chars).collect();
        if self.query.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}
