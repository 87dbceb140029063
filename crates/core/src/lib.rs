pub mod config;
pub mod controller;
pub mod export;
pub mod gateway;
pub mod messages;
pub mod metrics;
pub mod orchestrator;
pub mod projector;
pub mod session;
pub mod testing;
pub mod validator;

pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
};
pub use controller::{ControllerError, DisplaySink, UiController};
pub use export::{export_file_name, render_export, write_export, ExportError, EXPORT_BANNER};
pub use gateway::{GatewayError, HttpGateway, Operation, RemoteGateway};
pub use messages::{Locale, MessageError, MessageKey, MessageTable};
pub use orchestrator::{OrchestratorError, PipelineOrchestrator, StateUpdateCallback};
pub use projector::{project, ResultsProjector, ResultsView};
pub use session::{
    ErrorClass, GeneratedResults, InputFile, InputKind, OutputLocation, ParsedProject, RunState,
    SessionId, SessionState, Stage, StageFailure,
};
pub use validator::{FileValidator, ValidatedInputs, ValidationError};
