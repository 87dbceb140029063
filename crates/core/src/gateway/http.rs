//! HTTP implementation of the remote gateway.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::metrics;
use crate::session::{GeneratedResults, InputFile, OutputLocation, ParsedProject, SessionId};

use super::types::{
    BuildOutputRequest, BuildOutputResponse, ErrorResponse, GenerateTodoListRequest,
    GenerateTodoListResponse, ImportProjectResponse, ImportTranscriptResponse,
    ParseProjectRequest, ParseProjectResponse,
};
use super::{GatewayError, Operation, RemoteGateway};

/// Gateway to the conversion API over HTTP.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    project_root: String,
}

impl HttpGateway {
    /// Create a new gateway.
    pub fn new(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_root: config.project_root.trim_end_matches('/').to_string(),
        })
    }

    /// Server-side path of the project imported under a session.
    pub fn project_path(&self, session_id: &SessionId) -> String {
        format!("{}/{}", self.project_root, session_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode its body, recording request metrics.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let started = Instant::now();
        debug!(operation = %operation, "Sending remote request");

        let result = send_and_decode(operation, request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.class().as_str(),
        };
        metrics::REMOTE_REQUESTS
            .with_label_values(&[operation.as_str(), outcome])
            .inc();
        metrics::REMOTE_DURATION
            .with_label_values(&[operation.as_str()])
            .observe(started.elapsed().as_secs_f64());

        debug!(
            operation = %operation,
            outcome = outcome,
            duration_ms = started.elapsed().as_millis() as u64,
            "Remote request finished"
        );

        result
    }
}

async fn send_and_decode<T: DeserializeOwned>(
    operation: Operation,
    request: RequestBuilder,
) -> Result<T, GatewayError> {
    let transport = |e: reqwest::Error| GatewayError::Transport {
        operation,
        message: e.to_string(),
    };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;

    decode_response(operation, status, &body)
}

/// Classify a received response.
///
/// Non-2xx: a `{detail}` body is a remote detail, anything else a protocol
/// error carrying the status. 2xx: the body must decode as `T`.
fn decode_response<T: DeserializeOwned>(
    operation: Operation,
    status: StatusCode,
    body: &[u8],
) -> Result<T, GatewayError> {
    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .and_then(ErrorResponse::into_detail);

        return Err(match detail {
            Some(detail) => GatewayError::Remote {
                operation,
                status: status.as_u16(),
                detail,
            },
            None => GatewayError::Protocol {
                operation,
                status: status.as_u16(),
            },
        });
    }

    serde_json::from_slice(body).map_err(|e| {
        debug!(operation = %operation, error = %e, "Undecodable success response");
        GatewayError::Protocol {
            operation,
            status: status.as_u16(),
        }
    })
}

fn file_form(file: &InputFile) -> multipart::Form {
    let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    multipart::Form::new().part("file", part)
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn import_project(
        &self,
        session_id: &SessionId,
        file: &InputFile,
    ) -> Result<(), GatewayError> {
        let url = self.url(&format!(
            "/api/import-project/{}",
            urlencoding::encode(session_id.as_str())
        ));

        debug!(session_id = %session_id, file = %file.name, bytes = file.len(), "Importing project");

        let _: ImportProjectResponse = self
            .execute(
                Operation::ImportProject,
                self.client.post(&url).multipart(file_form(file)),
            )
            .await?;

        Ok(())
    }

    async fn import_transcript(
        &self,
        session_id: &SessionId,
        file: &InputFile,
    ) -> Result<String, GatewayError> {
        let url = self.url(&format!(
            "/api/import-transcript/{}",
            urlencoding::encode(session_id.as_str())
        ));

        debug!(session_id = %session_id, file = %file.name, bytes = file.len(), "Importing transcript");

        let response: ImportTranscriptResponse = self
            .execute(
                Operation::ImportTranscript,
                self.client.post(&url).multipart(file_form(file)),
            )
            .await?;

        match response.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(GatewayError::EmptyContent {
                operation: Operation::ImportTranscript,
            }),
        }
    }

    async fn parse_project(&self, session_id: &SessionId) -> Result<ParsedProject, GatewayError> {
        let body = ParseProjectRequest {
            project_path: self.project_path(session_id),
        };

        debug!(session_id = %session_id, project_path = %body.project_path, "Parsing project");

        let response: ParseProjectResponse = self
            .execute(
                Operation::ParseProject,
                self.client.post(self.url("/api/parse-project")).json(&body),
            )
            .await?;

        Ok(ParsedProject(response.parsed_project))
    }

    async fn generate_artifacts(
        &self,
        parsed_project: &ParsedProject,
        transcript: &str,
    ) -> Result<GeneratedResults, GatewayError> {
        let body = GenerateTodoListRequest {
            parsed_project: parsed_project.0.clone(),
            transcript: transcript.to_string(),
        };

        let response: GenerateTodoListResponse = self
            .execute(
                Operation::GenerateArtifacts,
                self.client.post(self.url("/api/generate-todolist")).json(&body),
            )
            .await?;

        Ok(response.into())
    }

    async fn persist(&self, results: &GeneratedResults) -> Result<OutputLocation, GatewayError> {
        let body = BuildOutputRequest::from(results);

        let response: BuildOutputResponse = self
            .execute(
                Operation::Persist,
                self.client.post(self.url("/api/build-output")).json(&body),
            )
            .await?;

        if response.path.trim().is_empty() {
            return Err(GatewayError::EmptyContent {
                operation: Operation::Persist,
            });
        }

        Ok(OutputLocation::new(response.path))
    }
}
