//! Pipeline lifecycle integration tests.
//!
//! These tests drive complete runs through the controller and orchestrator
//! over the mock gateway:
//! idle -> uploading -> parsing -> generating -> persisting -> done | failed

use std::sync::Arc;

use chrono::Local;
use serde_json::json;

use reunion_core::{
    testing::{fixtures, DisplayEvent, MockGateway, RecordedCall, RecordingSink},
    ControllerError, ErrorClass, FileValidator, GatewayError, InputFile, InputKind,
    MessageTable, Operation, PipelineOrchestrator, RunState, SessionId, Stage, UiController,
    EXPORT_BANNER,
};

/// Test helper wiring a controller to a mock gateway.
struct TestHarness {
    gateway: Arc<MockGateway>,
    controller: UiController<RecordingSink>,
}

impl TestHarness {
    fn new() -> Self {
        let gateway = Arc::new(MockGateway::new());
        let orchestrator =
            PipelineOrchestrator::new(Arc::clone(&gateway) as Arc<dyn reunion_core::RemoteGateway>);
        let controller = UiController::new(
            FileValidator::default(),
            orchestrator,
            MessageTable::default(),
            RecordingSink::new(),
        );

        Self {
            gateway,
            controller,
        }
    }

    fn select(&mut self, project: &str, transcript: &str) {
        self.controller.on_files_selected(
            InputKind::Project,
            Some(InputFile::new(project, fixtures::project_file().bytes)),
        );
        self.controller.on_files_selected(
            InputKind::Transcript,
            Some(InputFile::new(transcript, fixtures::transcript_file().bytes)),
        );
    }

    async fn run(&mut self) -> RunState {
        self.controller
            .on_start_requested()
            .await
            .expect("run should reach a terminal state")
            .run_state()
            .clone()
    }
}

#[tokio::test]
async fn test_full_run_reaches_done() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    assert!(harness.controller.start_enabled());

    let state = harness.run().await;

    assert_eq!(state, RunState::Done);
    assert_eq!(
        harness.gateway.operations().await,
        vec![
            Operation::ImportProject,
            Operation::ImportTranscript,
            Operation::ParseProject,
            Operation::GenerateArtifacts,
            Operation::Persist,
        ]
    );

    let session = harness.controller.session().unwrap();
    let results = session.results().unwrap();
    assert_eq!(results, &fixtures::generated_results());
    assert_eq!(
        session.output_location().unwrap().as_str(),
        "/tmp/output/results.md"
    );

    let view = harness.controller.sink().last_results().unwrap().clone();
    assert_eq!(
        view.context,
        "The team plans to split the billing module after the release."
    );
    assert!(view.technical_todo.contains("\"priority\": \"high\""));
    assert!(!harness.controller.sink().is_busy());
    assert_eq!(
        harness.controller.sink().notices(),
        vec!["Analysis complete"]
    );

    let text = harness.controller.export(Local::now()).unwrap();
    assert!(text.starts_with(EXPORT_BANNER));
    assert!(text.contains("PROJECT CONTEXT"));
    assert!(text.contains("TECHNICAL TODO LIST"));
    assert!(text.contains("CLARIFICATIONS REQUIRED"));
    assert!(text.contains("Output path: /tmp/output/results.md"));
}

#[tokio::test]
async fn test_every_session_scoped_call_uses_the_run_id() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    harness.run().await;

    let session_id = harness.controller.session().unwrap().id().clone();
    let calls = harness.gateway.calls().await;
    let scoped: Vec<&SessionId> = calls.iter().filter_map(RecordedCall::session_id).collect();

    assert_eq!(scoped.len(), 3);
    assert!(scoped.iter().all(|id| **id == session_id));
}

#[tokio::test]
async fn test_persist_forwards_generated_results() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    harness.run().await;

    let persisted = harness
        .gateway
        .calls()
        .await
        .into_iter()
        .find_map(|call| match call {
            RecordedCall::Persist { results } => Some(results),
            _ => None,
        })
        .unwrap();
    assert_eq!(persisted, fixtures::generated_results());
}

#[tokio::test]
async fn test_empty_transcript_fails_with_content_error() {
    let mut harness = TestHarness::new();
    harness.gateway.set_transcript_text("").await;
    harness.select("project.zip", "notes.txt");

    let state = harness.run().await;

    let failure = state.failure().unwrap();
    assert_eq!(failure.stage(), Stage::Uploading);
    assert_eq!(failure.class(), ErrorClass::Content);
    assert!(!harness
        .gateway
        .operations()
        .await
        .contains(&Operation::ParseProject));
    assert_eq!(
        harness.controller.sink().errors(),
        vec!["Uploading failed: The transcript contains no extractable text"]
    );
}

#[tokio::test]
async fn test_parse_failure_skips_generation_and_persistence() {
    let mut harness = TestHarness::new();
    harness
        .gateway
        .fail_on(
            Operation::ParseProject,
            GatewayError::Protocol {
                operation: Operation::ParseProject,
                status: 502,
            },
        )
        .await;
    harness.select("project.zip", "notes.txt");

    let state = harness.run().await;

    let failure = state.failure().unwrap();
    assert_eq!(failure.stage(), Stage::Parsing);
    assert_eq!(failure.reason(), "parse-project failed, status=502");

    let operations = harness.gateway.operations().await;
    assert!(!operations.contains(&Operation::GenerateArtifacts));
    assert!(!operations.contains(&Operation::Persist));

    let session = harness.controller.session().unwrap();
    assert!(session.transcript_text().is_some());
    assert!(session.parsed_project().is_none());
    assert!(harness.controller.results_view().is_none());
    assert!(harness.controller.sink().last_results().is_none());
}

#[tokio::test]
async fn test_remote_detail_on_project_import() {
    let mut harness = TestHarness::new();
    harness
        .gateway
        .fail_on(
            Operation::ImportProject,
            GatewayError::Remote {
                operation: Operation::ImportProject,
                status: 500,
                detail: "disk full".to_string(),
            },
        )
        .await;
    harness.select("project.zip", "notes.txt");

    let state = harness.run().await;

    assert_ne!(state, RunState::Done);
    let failure = state.failure().unwrap();
    assert_eq!(failure.stage().as_str(), "Uploading");
    assert_eq!(failure.reason(), "disk full");
    assert_eq!(failure.class(), ErrorClass::RemoteDetail);

    // The transcript is never uploaded after a failed project import.
    assert_eq!(
        harness.gateway.operations().await,
        vec![Operation::ImportProject]
    );
    assert_eq!(
        harness.controller.sink().errors(),
        vec!["Uploading failed: disk full"]
    );
}

#[tokio::test]
async fn test_unrecognized_transcript_keeps_start_disabled() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.pdf");

    assert!(!harness.controller.start_enabled());
    assert_eq!(harness.controller.sink().start_enabled(), Some(false));

    let err = harness.controller.on_start_requested().await.unwrap_err();
    assert!(matches!(err, ControllerError::NotReady(_)));
    assert!(harness.gateway.calls().await.is_empty());
    assert!(harness.controller.session().is_none());
    // Only the wrong-type reason, not a second "no file selected".
    assert_eq!(harness.controller.sink().errors().len(), 1);
}

#[tokio::test]
async fn test_start_enabled_follows_reselection() {
    let mut harness = TestHarness::new();

    harness.select("project.zip", "notes.pdf");
    assert!(!harness.controller.start_enabled());

    harness.controller.on_files_selected(
        InputKind::Transcript,
        Some(InputFile::new("notes.MD", b"# notes".to_vec())),
    );
    assert!(harness.controller.start_enabled());

    harness.controller.on_files_selected(
        InputKind::Project,
        Some(InputFile::new("project.rar", b"x".to_vec())),
    );
    assert!(!harness.controller.start_enabled());
    assert_eq!(harness.controller.sink().start_enabled(), Some(false));
}

#[tokio::test]
async fn test_second_run_replaces_first_session() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    harness.run().await;
    let first = harness.controller.session().unwrap().clone();

    harness.controller.on_reset_requested();
    harness.select("project.zip", "notes.txt");

    harness
        .gateway
        .set_results(reunion_core::GeneratedResults {
            context: json!("second"),
            technical_todo: json!(null),
            clarifications: json!(null),
        })
        .await;
    harness
        .gateway
        .fail_on(
            Operation::Persist,
            GatewayError::Transport {
                operation: Operation::Persist,
                message: "connection reset".to_string(),
            },
        )
        .await;
    harness.run().await;
    let second = harness.controller.session().unwrap();

    assert_ne!(first.id(), second.id());
    assert!(first.is_done());
    assert_eq!(second.run_state().failure().unwrap().stage(), Stage::Persisting);
    // Nothing from the first run survives in the second.
    assert!(second.output_location().is_none());
    assert_eq!(second.results().unwrap().context, json!("second"));
}

#[tokio::test]
async fn test_second_start_without_reset_is_refused() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    harness.run().await;
    let first_id = harness.controller.session().unwrap().id().clone();

    assert!(!harness.controller.start_enabled());
    assert_eq!(harness.controller.sink().start_enabled(), Some(false));

    let err = harness.controller.on_start_requested().await.unwrap_err();

    assert!(matches!(err, ControllerError::NotReset { .. }));
    assert_eq!(harness.gateway.calls().await.len(), 5);
    assert_eq!(harness.controller.session().unwrap().id(), &first_id);
    assert!(harness.controller.export(Local::now()).is_ok());
}

#[tokio::test]
async fn test_empty_persistence_result_names_the_output() {
    let mut harness = TestHarness::new();
    harness
        .gateway
        .fail_on(
            Operation::Persist,
            GatewayError::EmptyContent {
                operation: Operation::Persist,
            },
        )
        .await;
    harness.select("project.zip", "notes.txt");

    let state = harness.run().await;

    assert_eq!(state.failure().unwrap().class(), ErrorClass::Content);
    assert_eq!(
        harness.controller.sink().errors(),
        vec!["Persisting failed: The server did not return where the results were saved"]
    );
}

#[tokio::test]
async fn test_reset_discards_session_and_selections() {
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    harness.run().await;

    harness.controller.on_reset_requested();

    assert!(harness.controller.session().is_none());
    assert!(!harness.controller.start_enabled());
    let events = harness.controller.sink().events();
    assert_eq!(
        &events[events.len() - 2..],
        &[DisplayEvent::InputsReset, DisplayEvent::StartEnabled(false)]
    );
    assert!(harness.controller.export(Local::now()).is_err());

    harness.gateway.clear_calls().await;
    harness.select("project.zip", "notes.txt");
    assert_eq!(harness.run().await, RunState::Done);
    assert_eq!(harness.gateway.calls().await.len(), 5);
}

#[tokio::test]
async fn test_save_export_writes_file_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = TestHarness::new();
    harness.select("project.zip", "notes.txt");
    harness.run().await;

    let path = harness
        .controller
        .save_export(dir.path(), Local::now())
        .await
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with(EXPORT_BANNER));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("reunion-to-code-results-"));
    assert!(name.ends_with(".txt"));
    assert!(harness
        .controller
        .sink()
        .notices()
        .contains(&format!("Results saved to {}", path.display()).as_str()));
}
