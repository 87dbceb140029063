//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the remote gateway and a recording
//! display sink, allowing the full pipeline to be exercised without a
//! conversion server.
//!
//! # Example
//!
//! ```rust,ignore
//! use reunion_core::testing::{fixtures, MockGateway};
//!
//! let gateway = Arc::new(MockGateway::new());
//! gateway.set_transcript_text("").await;
//!
//! let session = PipelineOrchestrator::new(gateway.clone())
//!     .run(fixtures::validated_inputs())
//!     .await?;
//! ```

mod mock_gateway;
mod recording_sink;

pub use mock_gateway::{MockGateway, RecordedCall};
pub use recording_sink::{DisplayEvent, RecordingSink};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::session::{GeneratedResults, InputFile, ParsedProject};
    use crate::validator::{FileValidator, ValidatedInputs};

    /// A small project archive named `project.zip`.
    pub fn project_file() -> InputFile {
        // Empty zip: just the end-of-central-directory record.
        let mut bytes = vec![0x50, 0x4b, 0x05, 0x06];
        bytes.extend_from_slice(&[0u8; 18]);
        InputFile::new("project.zip", bytes)
    }

    /// A plain-text transcript named `notes.txt`.
    pub fn transcript_file() -> InputFile {
        InputFile::new(
            "notes.txt",
            b"Alice: we should split the billing module.\nBob: agreed, after the release.".to_vec(),
        )
    }

    /// `project.zip` + `notes.txt`, accepted by the default validator.
    pub fn validated_inputs() -> ValidatedInputs {
        FileValidator::default()
            .validate_inputs(Some(project_file()), Some(transcript_file()))
            .expect("fixture inputs must validate")
    }

    /// A parse artifact shaped like the server's.
    pub fn parsed_project() -> ParsedProject {
        ParsedProject(json!({
            "files": ["src/billing.py", "src/api.py"],
            "language": "python",
        }))
    }

    /// Results with prose context, structured todo list and clarifications.
    pub fn generated_results() -> GeneratedResults {
        GeneratedResults {
            context: json!("The team plans to split the billing module after the release."),
            technical_todo: json!({
                "tasks": [
                    {"title": "Extract billing into its own package", "priority": "high"},
                    {"title": "Add integration tests for invoices", "priority": "medium"},
                ]
            }),
            clarifications: json!(["Which release is meant?"]),
        }
    }
}
