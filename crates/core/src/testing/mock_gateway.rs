//! Mock remote gateway for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures;
use crate::gateway::{GatewayError, Operation, RemoteGateway};
use crate::session::{GeneratedResults, InputFile, OutputLocation, ParsedProject, SessionId};

/// A recorded gateway call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ImportProject {
        session_id: SessionId,
        file_name: String,
    },
    ImportTranscript {
        session_id: SessionId,
        file_name: String,
    },
    ParseProject {
        session_id: SessionId,
    },
    GenerateArtifacts {
        parsed_project: ParsedProject,
        transcript: String,
    },
    Persist {
        results: GeneratedResults,
    },
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::ImportProject { .. } => Operation::ImportProject,
            RecordedCall::ImportTranscript { .. } => Operation::ImportTranscript,
            RecordedCall::ParseProject { .. } => Operation::ParseProject,
            RecordedCall::GenerateArtifacts { .. } => Operation::GenerateArtifacts,
            RecordedCall::Persist { .. } => Operation::Persist,
        }
    }

    /// Session id the call was made under, for session-scoped calls.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            RecordedCall::ImportProject { session_id, .. }
            | RecordedCall::ImportTranscript { session_id, .. }
            | RecordedCall::ParseProject { session_id } => Some(session_id),
            _ => None,
        }
    }
}

/// Mock implementation of the RemoteGateway trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable transcript text, parse artifact, results and location
/// - Track calls for assertions
/// - Fail chosen operations
///
/// An empty transcript text is reported as `GatewayError::EmptyContent`,
/// like the HTTP gateway does.
#[derive(Debug)]
pub struct MockGateway {
    transcript_text: Arc<RwLock<String>>,
    parsed_project: Arc<RwLock<ParsedProject>>,
    results: Arc<RwLock<GeneratedResults>>,
    output_location: Arc<RwLock<String>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Operations that fail with the given error.
    failures: Arc<RwLock<HashMap<Operation, GatewayError>>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Create a mock where every operation succeeds.
    pub fn new() -> Self {
        Self {
            transcript_text: Arc::new(RwLock::new(
                "Alice: we should split the billing module.".to_string(),
            )),
            parsed_project: Arc::new(RwLock::new(fixtures::parsed_project())),
            results: Arc::new(RwLock::new(fixtures::generated_results())),
            output_location: Arc::new(RwLock::new("/tmp/output/results.md".to_string())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the text returned by transcript import.
    pub async fn set_transcript_text(&self, text: impl Into<String>) {
        *self.transcript_text.write().await = text.into();
    }

    /// Set the artifact returned by the parse stage.
    pub async fn set_parsed_project(&self, parsed: ParsedProject) {
        *self.parsed_project.write().await = parsed;
    }

    /// Set the results returned by generation.
    pub async fn set_results(&self, results: GeneratedResults) {
        *self.results.write().await = results;
    }

    /// Set the location returned by persistence.
    pub async fn set_output_location(&self, location: impl Into<String>) {
        *self.output_location.write().await = location.into();
    }

    /// Make an operation fail with `error` until cleared.
    pub async fn fail_on(&self, operation: Operation, error: GatewayError) {
        self.failures.write().await.insert(operation, error);
    }

    /// Make every operation succeed again.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the operations called, in order.
    pub async fn operations(&self) -> Vec<Operation> {
        self.calls
            .read()
            .await
            .iter()
            .map(RecordedCall::operation)
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedCall) -> Result<(), GatewayError> {
        let operation = call.operation();
        self.calls.write().await.push(call);

        match self.failures.read().await.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn import_project(
        &self,
        session_id: &SessionId,
        file: &InputFile,
    ) -> Result<(), GatewayError> {
        self.record(RecordedCall::ImportProject {
            session_id: session_id.clone(),
            file_name: file.name.clone(),
        })
        .await
    }

    async fn import_transcript(
        &self,
        session_id: &SessionId,
        file: &InputFile,
    ) -> Result<String, GatewayError> {
        self.record(RecordedCall::ImportTranscript {
            session_id: session_id.clone(),
            file_name: file.name.clone(),
        })
        .await?;

        let text = self.transcript_text.read().await.clone();
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyContent {
                operation: Operation::ImportTranscript,
            });
        }
        Ok(text)
    }

    async fn parse_project(&self, session_id: &SessionId) -> Result<ParsedProject, GatewayError> {
        self.record(RecordedCall::ParseProject {
            session_id: session_id.clone(),
        })
        .await?;

        Ok(self.parsed_project.read().await.clone())
    }

    async fn generate_artifacts(
        &self,
        parsed_project: &ParsedProject,
        transcript: &str,
    ) -> Result<GeneratedResults, GatewayError> {
        self.record(RecordedCall::GenerateArtifacts {
            parsed_project: parsed_project.clone(),
            transcript: transcript.to_string(),
        })
        .await?;

        Ok(self.results.read().await.clone())
    }

    async fn persist(&self, results: &GeneratedResults) -> Result<OutputLocation, GatewayError> {
        self.record(RecordedCall::Persist {
            results: results.clone(),
        })
        .await?;

        Ok(OutputLocation::new(self.output_location.read().await.clone()))
    }
}
