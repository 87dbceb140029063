//! Pipeline orchestrator implementation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, RemoteGateway};
use crate::metrics;
use crate::session::{RunState, SessionId, SessionState, Stage, StageFailure};
use crate::validator::ValidatedInputs;

use super::types::OrchestratorError;

/// Callback invoked after every run state transition.
pub type StateUpdateCallback = Arc<dyn Fn(&SessionId, &RunState) + Send + Sync>;

/// Outcome of a single stage that did not succeed.
enum StageError {
    /// Expected failure; ends the run in `Failed`.
    Remote(GatewayError),
    /// Internal fault; aborts `run` with an error.
    Fault(OrchestratorError),
}

impl From<GatewayError> for StageError {
    fn from(e: GatewayError) -> Self {
        StageError::Remote(e)
    }
}

impl From<OrchestratorError> for StageError {
    fn from(e: OrchestratorError) -> Self {
        StageError::Fault(e)
    }
}

/// The pipeline orchestrator - drives one session through every stage.
pub struct PipelineOrchestrator {
    gateway: Arc<dyn RemoteGateway>,
    on_update: Option<StateUpdateCallback>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            on_update: None,
        }
    }

    /// Set a callback notified of each state transition.
    pub fn with_update_callback(mut self, callback: StateUpdateCallback) -> Self {
        self.on_update = Some(callback);
        self
    }

    /// Run the whole pipeline on a fresh session.
    ///
    /// Always returns the session in a terminal state unless the state
    /// machine itself is violated. Each remote call is issued only after the
    /// previous one succeeded.
    pub async fn run(&self, inputs: ValidatedInputs) -> Result<SessionState, OrchestratorError> {
        let mut session = SessionState::new(inputs);
        let run_started = Instant::now();

        info!(
            session_id = %session.id(),
            project = %session.project_input().name,
            transcript = %session.transcript_input().name,
            "Starting pipeline run"
        );

        for stage in Stage::ALL {
            self.transition(&mut session, stage.run_state())?;

            let started = Instant::now();
            let outcome = self.run_stage(stage, &mut session).await;
            metrics::STAGE_DURATION
                .with_label_values(&[stage.as_str()])
                .observe(started.elapsed().as_secs_f64());

            match outcome {
                Ok(()) => {
                    metrics::STAGE_OUTCOMES
                        .with_label_values(&[stage.as_str(), "success"])
                        .inc();
                    debug!(
                        session_id = %session.id(),
                        stage = %stage,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Stage completed"
                    );
                }
                Err(StageError::Remote(error)) => {
                    metrics::STAGE_OUTCOMES
                        .with_label_values(&[stage.as_str(), error.class().as_str()])
                        .inc();
                    metrics::RUNS_TOTAL.with_label_values(&["failed"]).inc();
                    warn!(
                        session_id = %session.id(),
                        stage = %stage,
                        operation = %error.operation(),
                        class = %error.class(),
                        status = error.status(),
                        "Stage failed: {}",
                        error
                    );

                    self.transition(&mut session, RunState::Failed(StageFailure::new(stage, error)))?;
                    return Ok(session);
                }
                Err(StageError::Fault(e)) => return Err(e),
            }
        }

        self.transition(&mut session, RunState::Done)?;
        metrics::RUNS_TOTAL.with_label_values(&["done"]).inc();

        info!(
            session_id = %session.id(),
            output_location = %session.output_location().map(|l| l.as_str()).unwrap_or_default(),
            duration_ms = run_started.elapsed().as_millis() as u64,
            "Pipeline run completed"
        );

        Ok(session)
    }

    fn transition(
        &self,
        session: &mut SessionState,
        next: RunState,
    ) -> Result<(), OrchestratorError> {
        session.transition(next)?;

        info!(
            session_id = %session.id(),
            state = session.run_state().state_type(),
            "Run state changed"
        );

        if let Some(callback) = &self.on_update {
            callback(session.id(), session.run_state());
        }

        Ok(())
    }

    async fn run_stage(&self, stage: Stage, session: &mut SessionState) -> Result<(), StageError> {
        match stage {
            Stage::Uploading => self.upload(session).await,
            Stage::Parsing => self.parse(session).await,
            Stage::Generating => self.generate(session).await,
            Stage::Persisting => self.persist(session).await,
        }
    }

    /// Project first: parsing depends on it residing under the session id.
    async fn upload(&self, session: &mut SessionState) -> Result<(), StageError> {
        self.gateway
            .import_project(session.id(), session.project_input())
            .await?;

        let text = self
            .gateway
            .import_transcript(session.id(), session.transcript_input())
            .await?;

        debug!(session_id = %session.id(), chars = text.chars().count(), "Transcript extracted");
        session.record_transcript_text(text);
        Ok(())
    }

    async fn parse(&self, session: &mut SessionState) -> Result<(), StageError> {
        let parsed = self.gateway.parse_project(session.id()).await?;
        session.record_parsed_project(parsed);
        Ok(())
    }

    async fn generate(&self, session: &mut SessionState) -> Result<(), StageError> {
        let parsed = session
            .parsed_project()
            .ok_or_else(|| OrchestratorError::MissingArtifact("parsed project".to_string()))?;
        let transcript = session
            .transcript_text()
            .ok_or_else(|| OrchestratorError::MissingArtifact("transcript text".to_string()))?;

        let results = self.gateway.generate_artifacts(parsed, transcript).await?;
        session.record_results(results);
        Ok(())
    }

    async fn persist(&self, session: &mut SessionState) -> Result<(), StageError> {
        let results = session
            .results()
            .ok_or_else(|| OrchestratorError::MissingArtifact("generated results".to_string()))?;

        let location = self.gateway.persist(results).await?;
        session.record_output_location(location);
        Ok(())
    }
}
