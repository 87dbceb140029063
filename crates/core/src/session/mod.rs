//! Per-run session state.
//!
//! A [`SessionState`] is created fresh at the start of every run and is
//! owned by the orchestrator until the run reaches a terminal state. Its
//! mutators are crate-private: other components only ever read it.

mod types;

pub use types::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::validator::ValidatedInputs;

/// Attempted a transition the state machine does not allow.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid run state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: String,
    pub to: String,
}

/// Single source of truth for one pipeline run.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: SessionId,
    project_input: InputFile,
    transcript_input: InputFile,
    transcript_text: Option<String>,
    parsed_project: Option<ParsedProject>,
    results: Option<GeneratedResults>,
    output_location: Option<OutputLocation>,
    run_state: RunState,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Start a new session from validated inputs, with a fresh identifier.
    pub(crate) fn new(inputs: ValidatedInputs) -> Self {
        let (project_input, transcript_input) = inputs.into_parts();
        Self {
            id: SessionId::generate(),
            project_input,
            transcript_input,
            transcript_text: None,
            parsed_project: None,
            results: None,
            output_location: None,
            run_state: RunState::Idle,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn project_input(&self) -> &InputFile {
        &self.project_input
    }

    pub fn transcript_input(&self) -> &InputFile {
        &self.transcript_input
    }

    /// Text extracted from the transcript (after the upload stage).
    pub fn transcript_text(&self) -> Option<&str> {
        self.transcript_text.as_deref()
    }

    /// Parse artifact (after the parse stage).
    pub fn parsed_project(&self) -> Option<&ParsedProject> {
        self.parsed_project.as_ref()
    }

    /// Generated results (after the generation stage).
    pub fn results(&self) -> Option<&GeneratedResults> {
        self.results.as_ref()
    }

    /// Where the results were persisted (after the persistence stage).
    pub fn output_location(&self) -> Option<&OutputLocation> {
        self.output_location.as_ref()
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_done(&self) -> bool {
        matches!(self.run_state, RunState::Done)
    }

    pub(crate) fn transition(&mut self, next: RunState) -> Result<(), InvalidTransition> {
        if !self.run_state.can_transition_to(&next) {
            return Err(InvalidTransition {
                from: self.run_state.to_string(),
                to: next.to_string(),
            });
        }
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        self.run_state = next;
        Ok(())
    }

    pub(crate) fn record_transcript_text(&mut self, text: String) {
        self.transcript_text = Some(text);
    }

    pub(crate) fn record_parsed_project(&mut self, parsed: ParsedProject) {
        self.parsed_project = Some(parsed);
    }

    pub(crate) fn record_results(&mut self, results: GeneratedResults) {
        self.results = Some(results);
    }

    pub(crate) fn record_output_location(&mut self, location: OutputLocation) {
        self.output_location = Some(location);
    }
}
