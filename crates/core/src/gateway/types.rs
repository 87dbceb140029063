//! Wire formats of the remote conversion API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::GeneratedResults;

/// Body of `POST /api/parse-project`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseProjectRequest {
    pub project_path: String,
}

/// Body of `POST /api/generate-todolist`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateTodoListRequest {
    pub parsed_project: Value,
    pub transcript: String,
}

/// Body of `POST /api/build-output`.
///
/// Carries exactly the three generated fields and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildOutputRequest {
    pub context: Value,
    pub technical_todo: Value,
    pub clarifications: Value,
}

impl From<&GeneratedResults> for BuildOutputRequest {
    fn from(results: &GeneratedResults) -> Self {
        Self {
            context: results.context.clone(),
            technical_todo: results.technical_todo.clone(),
            clarifications: results.clarifications.clone(),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Success body of `import-project`; any JSON object is accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct ImportProjectResponse {
    #[serde(default)]
    #[allow(dead_code)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportTranscriptResponse {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseProjectResponse {
    pub parsed_project: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateTodoListResponse {
    pub context: Value,
    pub technical_todolist: Value,
    pub clarifications: Value,
}

impl From<GenerateTodoListResponse> for GeneratedResults {
    fn from(r: GenerateTodoListResponse) -> Self {
        Self {
            context: r.context,
            technical_todo: r.technical_todolist,
            clarifications: r.clarifications,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildOutputResponse {
    pub path: String,
}

/// Failure body: `{detail: ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Value,
}

impl ErrorResponse {
    /// The detail as display text, if one was provided.
    ///
    /// Non-string details (e.g. validation error lists) are kept as compact JSON.
    pub fn into_detail(self) -> Option<String> {
        match self.detail {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
