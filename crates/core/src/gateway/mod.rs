//! Boundary adapter to the remote conversion service.
//!
//! Each [`RemoteGateway`] operation is a single request/response round trip.
//! Every failure is reported as a [`GatewayError`] whose variant records how
//! it failed (remote detail, undecodable response, transport, or empty
//! content), so callers never have to inspect raw HTTP.

mod http;
mod types;

pub use http::HttpGateway;
pub use types::*;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::{MessageKey, MessageTable};
use crate::session::{
    ErrorClass, GeneratedResults, InputFile, OutputLocation, ParsedProject, SessionId, Stage,
};

/// One remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ImportProject,
    ImportTranscript,
    ParseProject,
    GenerateArtifacts,
    Persist,
}

impl Operation {
    /// Endpoint name, also used as the operation label in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ImportProject => "import-project",
            Operation::ImportTranscript => "import-transcript",
            Operation::ParseProject => "parse-project",
            Operation::GenerateArtifacts => "generate-todolist",
            Operation::Persist => "build-output",
        }
    }

    /// The stage this operation belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Operation::ImportProject | Operation::ImportTranscript => Stage::Uploading,
            Operation::ParseProject => Stage::Parsing,
            Operation::GenerateArtifacts => Stage::Generating,
            Operation::Persist => Stage::Persisting,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when calling the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The remote side returned a structured failure detail (shown verbatim).
    #[error("{detail}")]
    Remote {
        operation: Operation,
        status: u16,
        detail: String,
    },

    /// The response could not be decoded as the expected structure.
    #[error("{operation} failed, status={status}")]
    Protocol { operation: Operation, status: u16 },

    /// The request never produced a response.
    #[error("{operation} could not reach the server: {message}")]
    Transport { operation: Operation, message: String },

    /// The call succeeded but carried no usable content.
    #[error("{operation} returned no extractable content")]
    EmptyContent { operation: Operation },
}

impl GatewayError {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayError::Remote { operation, .. }
            | GatewayError::Protocol { operation, .. }
            | GatewayError::Transport { operation, .. }
            | GatewayError::EmptyContent { operation } => *operation,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::Remote { .. } => ErrorClass::RemoteDetail,
            GatewayError::Protocol { .. } => ErrorClass::Protocol,
            GatewayError::Transport { .. } => ErrorClass::Transport,
            GatewayError::EmptyContent { .. } => ErrorClass::Content,
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Remote { status, .. } | GatewayError::Protocol { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Localized reason for display.
    pub fn user_message(&self, messages: &MessageTable) -> String {
        match self {
            GatewayError::Remote { detail, .. } => detail.clone(),
            GatewayError::Protocol { operation, status } => messages.render(
                MessageKey::ErrorProtocol,
                &[
                    ("operation", operation.as_str()),
                    ("status", &status.to_string()),
                ],
            ),
            GatewayError::Transport { operation, .. } => messages.render(
                MessageKey::ErrorTransport,
                &[("operation", operation.as_str())],
            ),
            GatewayError::EmptyContent {
                operation: Operation::Persist,
            } => messages.get(MessageKey::ErrorEmptyOutput).to_string(),
            GatewayError::EmptyContent { .. } => {
                messages.get(MessageKey::ErrorEmptyContent).to_string()
            }
        }
    }
}

/// The remote conversion service.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Upload the project archive under the session namespace.
    async fn import_project(
        &self,
        session_id: &SessionId,
        file: &InputFile,
    ) -> Result<(), GatewayError>;

    /// Upload the transcript and return its extracted plain text.
    ///
    /// A success response without text is `GatewayError::EmptyContent`.
    async fn import_transcript(
        &self,
        session_id: &SessionId,
        file: &InputFile,
    ) -> Result<String, GatewayError>;

    /// Parse the project previously imported under this session.
    async fn parse_project(&self, session_id: &SessionId) -> Result<ParsedProject, GatewayError>;

    /// Generate context, todo list and clarifications.
    async fn generate_artifacts(
        &self,
        parsed_project: &ParsedProject,
        transcript: &str,
    ) -> Result<GeneratedResults, GatewayError>;

    /// Persist the three results and return where they were stored.
    async fn persist(&self, results: &GeneratedResults) -> Result<OutputLocation, GatewayError>;
}
