//! Headless UI controller.
//!
//! Turns the three user triggers (files selected, start requested, reset
//! requested) into validator and orchestrator calls, and reports everything
//! visible through a [`DisplaySink`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, info};

use crate::export::{self, ExportError};
use crate::messages::{MessageKey, MessageTable};
use crate::orchestrator::{OrchestratorError, PipelineOrchestrator};
use crate::projector::{ResultsProjector, ResultsView};
use crate::session::{InputFile, InputKind, RunState, SessionState};
use crate::validator::{FileValidator, ValidationError};

/// Where the controller sends everything the user should see.
pub trait DisplaySink: Send {
    /// Enable or disable the start action.
    fn set_start_enabled(&mut self, enabled: bool);

    /// Show or hide the busy indicator.
    fn set_busy(&mut self, busy: bool);

    fn show_error(&mut self, message: &str);

    fn show_notice(&mut self, message: &str);

    /// Show the three result sections of a completed run.
    fn show_results(&mut self, view: &ResultsView);

    /// Clear both file inputs so they can be selected again.
    fn reset_inputs(&mut self);
}

/// Errors that can occur when handling a user trigger.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Start requested while the inputs do not validate.
    #[error("cannot start: {0}")]
    NotReady(#[from] ValidationError),

    /// Start requested while a finished session is still held.
    #[error("cannot start: the last run is {state}, reset first")]
    NotReset { state: String },

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Binds user triggers to one session at a time.
pub struct UiController<S: DisplaySink> {
    validator: FileValidator,
    orchestrator: PipelineOrchestrator,
    messages: MessageTable,
    projector: ResultsProjector,
    sink: S,
    project: Option<InputFile>,
    transcript: Option<InputFile>,
    /// Slots whose last selection was rejected with a reason already shown.
    rejected: HashSet<InputKind>,
    session: Option<SessionState>,
}

impl<S: DisplaySink> UiController<S> {
    /// Create a controller with no selections; start is disabled.
    pub fn new(
        validator: FileValidator,
        orchestrator: PipelineOrchestrator,
        messages: MessageTable,
        sink: S,
    ) -> Self {
        let projector = ResultsProjector::from_messages(&messages);
        let mut controller = Self {
            validator,
            orchestrator,
            messages,
            projector,
            sink,
            project: None,
            transcript: None,
            rejected: HashSet::new(),
            session: None,
        };
        controller.refresh_start();
        controller
    }

    /// A file was selected (or deselected) for one input.
    ///
    /// A rejected file is cleared from its slot and the reason shown.
    pub fn on_files_selected(&mut self, kind: InputKind, file: Option<InputFile>) {
        let verdict = self.validator.validate(kind, file.as_ref());

        let accepted = match verdict {
            Ok(()) => {
                self.rejected.remove(&kind);
                file
            }
            Err(e) => {
                if let ValidationError::WrongType { .. } = e {
                    self.sink.show_error(&e.user_message(&self.messages));
                    self.rejected.insert(kind);
                } else {
                    self.rejected.remove(&kind);
                }
                debug!(input = %kind, error = %e, "Input rejected");
                None
            }
        };

        match kind {
            InputKind::Project => self.project = accepted,
            InputKind::Transcript => self.transcript = accepted,
        }

        self.refresh_start();
    }

    /// Whether a run may start: no finished session is held and both
    /// current selections validate.
    pub fn start_enabled(&self) -> bool {
        self.session.is_none()
            && self
                .validator
                .validate_project_file(self.project.as_ref())
                .is_ok()
            && self
                .validator
                .validate_transcript_file(self.transcript.as_ref())
                .is_ok()
    }

    /// Run the pipeline on the current selections.
    ///
    /// A finished session blocks new runs until [`Self::on_reset_requested`].
    pub async fn on_start_requested(&mut self) -> Result<&SessionState, ControllerError> {
        if let Some(session) = &self.session {
            return Err(ControllerError::NotReset {
                state: session.run_state().state_type().to_string(),
            });
        }

        let inputs = match self
            .validator
            .validate_inputs(self.project.clone(), self.transcript.clone())
        {
            Ok(inputs) => inputs,
            Err(e) => {
                // A missing file whose rejection reason is on screen already.
                let shown = matches!(e, ValidationError::NoFileSelected { input }
                    if self.rejected.contains(&input));
                if !shown {
                    self.sink.show_error(&e.user_message(&self.messages));
                }
                return Err(e.into());
            }
        };

        self.sink.set_start_enabled(false);
        self.sink.set_busy(true);

        let outcome = self.orchestrator.run(inputs).await;
        self.sink.set_busy(false);

        let session = match outcome {
            Ok(session) => session,
            Err(e) => {
                self.sink.show_error(&e.to_string());
                self.refresh_start();
                return Err(e.into());
            }
        };

        match session.run_state() {
            RunState::Done => {
                if let Some(view) = ResultsView::from_session(&session, &self.projector) {
                    self.sink.show_results(&view);
                }
                self.sink.show_notice(self.messages.get(MessageKey::RunCompleted));
            }
            RunState::Failed(failure) => {
                self.sink.show_error(&failure.user_message(&self.messages));
            }
            _ => {}
        }

        info!(
            session_id = %session.id(),
            state = session.run_state().state_type(),
            "Run finished"
        );

        let session = &*self.session.insert(session);
        self.sink.set_start_enabled(false);
        Ok(session)
    }

    /// Discard the session and both selections.
    pub fn on_reset_requested(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session_id = %session.id(), "Discarding session");
        }
        self.project = None;
        self.transcript = None;
        self.rejected.clear();
        self.sink.reset_inputs();
        self.refresh_start();
    }

    /// Export text of the held session, timestamped at `at`.
    pub fn export(&self, at: DateTime<Local>) -> Result<String, ControllerError> {
        let session = self.session.as_ref().ok_or_else(|| ExportError::NotReady {
            state: RunState::Idle.state_type().to_string(),
        })?;

        Ok(export::render_export(
            session,
            &self.projector,
            &self.messages,
            at,
        )?)
    }

    /// Write the export into `directory` and notify the user.
    pub async fn save_export(
        &mut self,
        directory: &Path,
        at: DateTime<Local>,
    ) -> Result<PathBuf, ControllerError> {
        let contents = self.export(at)?;
        let path = export::write_export(directory, &contents, at).await?;

        let notice = self.messages.render(
            MessageKey::ExportSaved,
            &[("path", &path.display().to_string())],
        );
        self.sink.show_notice(&notice);

        Ok(path)
    }

    /// The session of the last run, if not reset since.
    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// Results of the last run, when it completed.
    pub fn results_view(&self) -> Option<ResultsView> {
        self.session
            .as_ref()
            .and_then(|session| ResultsView::from_session(session, &self.projector))
    }

    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn refresh_start(&mut self) {
        let enabled = self.start_enabled();
        self.sink.set_start_enabled(enabled);
    }
}
