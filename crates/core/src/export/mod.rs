//! Plain-text export of a completed run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;

use crate::messages::{MessageKey, MessageTable};
use crate::projector::{ResultsProjector, ResultsView};
use crate::session::SessionState;

/// First line of every export.
pub const EXPORT_BANNER: &str = "REUNION TO CODE - GENERATED RESULTS";

const RULE_WIDTH: usize = 50;

/// Errors that can occur when exporting results.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Only a `Done` session has results to export.
    #[error("no completed run to export (state: {state})")]
    NotReady { state: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the export text for a completed session.
pub fn render_export(
    session: &SessionState,
    projector: &ResultsProjector,
    messages: &MessageTable,
    generated_at: DateTime<Local>,
) -> Result<String, ExportError> {
    let view = ResultsView::from_session(session, projector).ok_or_else(|| ExportError::NotReady {
        state: session.run_state().state_type().to_string(),
    })?;

    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let mut out = String::new();
    out.push_str(EXPORT_BANNER);
    out.push('\n');
    out.push_str(&heavy);
    out.push('\n');

    for (key, body) in [
        (MessageKey::SectionContext, &view.context),
        (MessageKey::SectionTodo, &view.technical_todo),
        (MessageKey::SectionClarifications, &view.clarifications),
    ] {
        out.push('\n');
        out.push_str(messages.get(key));
        out.push('\n');
        out.push_str(&light);
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&heavy);
    out.push('\n');
    out.push_str(&format!(
        "{}: {}\n",
        messages.get(MessageKey::GeneratedOn),
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "{}: {}\n",
        messages.get(MessageKey::OutputPath),
        view.output_location
            .as_deref()
            .unwrap_or_else(|| messages.get(MessageKey::NotAvailable))
    ));

    Ok(out)
}

/// File name for an export taken at `at`.
pub fn export_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("reunion-to-code-results-{}.txt", at.timestamp_millis())
}

/// Write export text into `directory`, returning the file path.
pub async fn write_export(
    directory: &Path,
    contents: &str,
    at: DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = directory.join(export_file_name(&at));

    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use serde_json::json;

    use crate::gateway::{GatewayError, Operation};
    use crate::messages::Locale;
    use crate::orchestrator::PipelineOrchestrator;
    use crate::session::GeneratedResults;
    use crate::testing::{fixtures, MockGateway};

    async fn run_with(gateway: MockGateway) -> SessionState {
        PipelineOrchestrator::new(Arc::new(gateway))
            .run(fixtures::validated_inputs())
            .await
            .unwrap()
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).single().unwrap()
    }

    #[tokio::test]
    async fn test_render_export_layout() {
        let gateway = MockGateway::new();
        gateway
            .set_results(GeneratedResults {
                context: json!("Migrating the billing service."),
                technical_todo: json!({"tasks": ["split module"]}),
                clarifications: json!(""),
            })
            .await;
        gateway.set_output_location("/srv/out/session.md").await;
        let session = run_with(gateway).await;

        let text = render_export(
            &session,
            &ResultsProjector::default(),
            &MessageTable::default(),
            fixed_time(),
        )
        .unwrap();

        let rule = "=".repeat(50);
        let dashes = "-".repeat(50);
        let expected = format!(
            "REUNION TO CODE - GENERATED RESULTS\n{rule}\n\n\
             PROJECT CONTEXT\n{dashes}\nMigrating the billing service.\n\n\
             TECHNICAL TODO LIST\n{dashes}\n{{\n  \"tasks\": [\n    \"split module\"\n  ]\n}}\n\n\
             CLARIFICATIONS REQUIRED\n{dashes}\nNo data available\n\n\
             {rule}\nGenerated on: 2024-03-05 14:30:00\nOutput path: /srv/out/session.md\n"
        );
        assert_eq!(text, expected);
        assert!(text.starts_with(EXPORT_BANNER));
    }

    #[tokio::test]
    async fn test_render_export_localized_headings() {
        let session = run_with(MockGateway::new()).await;
        let messages = MessageTable::new(Locale::Fr);

        let text = render_export(
            &session,
            &ResultsProjector::from_messages(&messages),
            &messages,
            fixed_time(),
        )
        .unwrap();

        assert!(text.starts_with(EXPORT_BANNER));
        assert!(text.contains("CONTEXTE DU PROJET"));
        assert!(text.contains("Généré le: 2024-03-05 14:30:00"));
    }

    #[tokio::test]
    async fn test_render_export_requires_done_session() {
        let gateway = MockGateway::new();
        gateway
            .fail_on(
                Operation::ParseProject,
                GatewayError::Transport {
                    operation: Operation::ParseProject,
                    message: "connection refused".to_string(),
                },
            )
            .await;
        let session = run_with(gateway).await;

        let err = render_export(
            &session,
            &ResultsProjector::default(),
            &MessageTable::default(),
            fixed_time(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::NotReady { ref state } if state == "failed"));
    }

    #[test]
    fn test_export_file_name_uses_unix_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            export_file_name(&at),
            "reunion-to-code-results-1700000000123.txt"
        );
    }

    #[tokio::test]
    async fn test_write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let at = Local::now();

        let path = write_export(dir.path(), "hello", at).await.unwrap();

        assert_eq!(path, dir.path().join(export_file_name(&at)));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_write_export_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = write_export(&missing, "hello", Local::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
