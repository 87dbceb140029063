//! Session data types.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::messages::{MessageKey, MessageTable};

/// Unique identifier of one pipeline run.
///
/// Namespaces every server-side effect of the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh, never reused identifier.
    pub fn generate() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file selected by the user, held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name as selected (no directory part).
    pub name: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Which of the two required inputs a file fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Project,
    Transcript,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Project => "project",
            InputKind::Transcript => "transcript",
        }
    }

    pub(crate) fn message_key(&self) -> MessageKey {
        match self {
            InputKind::Project => MessageKey::InputProject,
            InputKind::Transcript => MessageKey::InputTranscript,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured project representation produced by the parse stage.
///
/// Opaque to the client; forwarded as-is to generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedProject(pub Value);

/// The three named results of the generation stage.
///
/// Each field is either prose or structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResults {
    pub context: Value,
    pub technical_todo: Value,
    pub clarifications: Value,
}

/// Handle returned by the persistence stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputLocation(String);

impl OutputLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Uploading,
    Parsing,
    Generating,
    Persisting,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Uploading,
        Stage::Parsing,
        Stage::Generating,
        Stage::Persisting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Uploading => "Uploading",
            Stage::Parsing => "Parsing",
            Stage::Generating => "Generating",
            Stage::Persisting => "Persisting",
        }
    }

    /// The run state a session is in while this stage executes.
    pub fn run_state(&self) -> RunState {
        match self {
            Stage::Uploading => RunState::Uploading,
            Stage::Parsing => RunState::Parsing,
            Stage::Generating => RunState::Generating,
            Stage::Persisting => RunState::Persisting,
        }
    }

    pub fn message_key(&self) -> MessageKey {
        match self {
            Stage::Uploading => MessageKey::StageUploading,
            Stage::Parsing => MessageKey::StageParsing,
            Stage::Generating => MessageKey::StageGenerating,
            Stage::Persisting => MessageKey::StagePersisting,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of every failure a user can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Bad or missing input file, caught before any network call.
    Validation,
    /// The remote call succeeded but returned semantically empty content.
    Content,
    /// The remote side returned a structured failure detail.
    RemoteDetail,
    /// The response body could not be decoded.
    Protocol,
    /// The remote side could not be reached.
    Transport,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Validation => "validation",
            ErrorClass::Content => "content",
            ErrorClass::RemoteDetail => "remote_detail",
            ErrorClass::Protocol => "protocol",
            ErrorClass::Transport => "transport",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run stopped: the stage that failed and its classified error.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFailure {
    stage: Stage,
    error: GatewayError,
}

impl StageFailure {
    pub fn new(stage: Stage, error: GatewayError) -> Self {
        Self { stage, error }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn error(&self) -> &GatewayError {
        &self.error
    }

    pub fn class(&self) -> ErrorClass {
        self.error.class()
    }

    /// Untranslated failure reason; a remote detail is returned verbatim.
    pub fn reason(&self) -> String {
        self.error.to_string()
    }

    /// Localized message naming the stage and the reason.
    pub fn user_message(&self, messages: &MessageTable) -> String {
        let stage = messages.get(self.stage.message_key());
        let reason = self.error.user_message(messages);
        messages.render(
            MessageKey::StageFailed,
            &[("stage", stage), ("reason", &reason)],
        )
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Discriminated run state of a session.
///
/// ```text
/// Idle -> Uploading -> Parsing -> Generating -> Persisting -> Done
/// ```
///
/// Any active state can transition to `Failed`. `Done` and `Failed` are
/// terminal; only a reset (a brand-new session) leaves them.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Idle,
    Uploading,
    Parsing,
    Generating,
    Persisting,
    Done,
    Failed(StageFailure),
}

impl RunState {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }

    /// Returns true while a stage is executing.
    pub fn is_active(&self) -> bool {
        self.stage().is_some()
    }

    /// The stage executing in this state, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunState::Uploading => Some(Stage::Uploading),
            RunState::Parsing => Some(Stage::Parsing),
            RunState::Generating => Some(Stage::Generating),
            RunState::Persisting => Some(Stage::Persisting),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            RunState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns the state type as a string (for logging).
    pub fn state_type(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Uploading => "uploading",
            RunState::Parsing => "parsing",
            RunState::Generating => "generating",
            RunState::Persisting => "persisting",
            RunState::Done => "done",
            RunState::Failed(_) => "failed",
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match (self, next) {
            (RunState::Idle, RunState::Uploading)
            | (RunState::Uploading, RunState::Parsing)
            | (RunState::Parsing, RunState::Generating)
            | (RunState::Generating, RunState::Persisting)
            | (RunState::Persisting, RunState::Done) => true,
            (RunState::Failed(_), _) | (RunState::Done, _) => false,
            // A failure is attributed to the stage that was executing.
            (current, RunState::Failed(failure)) => current.stage() == Some(failure.stage()),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Failed(failure) => write!(f, "failed ({})", failure),
            other => f.write_str(other.state_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Operation;

    fn upload_failure() -> StageFailure {
        StageFailure::new(
            Stage::Uploading,
            GatewayError::Remote {
                operation: Operation::ImportProject,
                status: 500,
                detail: "disk full".to_string(),
            },
        )
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("session_"));
    }

    #[test]
    fn test_idle_state() {
        let state = RunState::Idle;
        assert!(!state.is_terminal());
        assert!(!state.is_active());
        assert_eq!(state.state_type(), "idle");
    }

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            RunState::Idle,
            RunState::Uploading,
            RunState::Parsing,
            RunState::Generating,
            RunState::Persisting,
            RunState::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(RunState::Done.is_terminal());
    }

    #[test]
    fn test_stages_never_reorder() {
        assert!(!RunState::Idle.can_transition_to(&RunState::Parsing));
        assert!(!RunState::Uploading.can_transition_to(&RunState::Generating));
        assert!(!RunState::Parsing.can_transition_to(&RunState::Uploading));
        assert!(!RunState::Persisting.can_transition_to(&RunState::Persisting));
    }

    #[test]
    fn test_failure_only_from_its_own_stage() {
        let failed = RunState::Failed(upload_failure());
        assert!(RunState::Uploading.can_transition_to(&failed));
        assert!(!RunState::Parsing.can_transition_to(&failed));
        assert!(!RunState::Idle.can_transition_to(&failed));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let failed = RunState::Failed(upload_failure());
        assert!(failed.is_terminal());
        assert!(!failed.can_transition_to(&RunState::Idle));
        assert!(!failed.can_transition_to(&RunState::Uploading));
        assert!(!RunState::Done.can_transition_to(&RunState::Idle));
    }

    #[test]
    fn test_stage_failure_reason_is_verbatim_detail() {
        let failure = upload_failure();
        assert_eq!(failure.stage().as_str(), "Uploading");
        assert_eq!(failure.reason(), "disk full");
        assert_eq!(failure.class(), ErrorClass::RemoteDetail);
        assert_eq!(failure.to_string(), "Uploading failed: disk full");
    }

    #[test]
    fn test_stage_failure_user_message_localized() {
        let failure = StageFailure::new(
            Stage::Uploading,
            GatewayError::EmptyContent {
                operation: Operation::ImportTranscript,
            },
        );
        let en = failure.user_message(&MessageTable::new(crate::messages::Locale::En));
        assert_eq!(
            en,
            "Uploading failed: The transcript contains no extractable text"
        );

        let fr = failure.user_message(&MessageTable::new(crate::messages::Locale::Fr));
        assert!(fr.starts_with("Échec de l'étape Téléversement"));
    }

    #[test]
    fn test_input_file_debug_hides_bytes() {
        let file = InputFile::new("notes.txt", b"secret meeting notes".to_vec());
        let debug = format!("{:?}", file);
        assert!(debug.contains("notes.txt"));
        assert!(!debug.contains("secret"));
        assert_eq!(file.len(), 20);
    }
}
