//! Types for the pipeline orchestrator.

use thiserror::Error;

use crate::session::InvalidTransition;

/// Faults in the orchestrator's own bookkeeping.
///
/// Remote failures are not errors at this level; they end the run in
/// `RunState::Failed`.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The state machine was asked for an illegal transition.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// A stage ran without the artifact an earlier stage should have produced.
    #[error("missing artifact in session: {0}")]
    MissingArtifact(String),
}
