//! Pipeline orchestrator.
//!
//! Sequences the remote stages over a fresh [`SessionState`](crate::session::SessionState):
//! - **Uploading**: import the project, then import the transcript
//! - **Parsing**: parse the project imported under the session id
//! - **Generating**: combine the parsed project and transcript text
//! - **Persisting**: store the three generated results
//!
//! The first failing stage ends the run in `Failed`; later stages never run.

mod runner;
mod types;

pub use runner::{PipelineOrchestrator, StateUpdateCallback};
pub use types::OrchestratorError;
