//! Input file validation.
//!
//! Pure predicates deciding whether a selected file may fill one of the
//! two run inputs. Matching is by file name only and case-insensitive.

use thiserror::Error;

use crate::config::ValidationConfig;
use crate::messages::{MessageKey, MessageTable};
use crate::session::{ErrorClass, InputFile, InputKind};

/// Why a file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nothing selected for this input.
    #[error("no {input} file selected")]
    NoFileSelected { input: InputKind },

    /// A file was selected but its type is not accepted.
    #[error("'{name}' is not a valid {input} file (expected {expected})")]
    WrongType {
        input: InputKind,
        name: String,
        expected: String,
    },
}

impl ValidationError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }

    pub fn input(&self) -> InputKind {
        match self {
            ValidationError::NoFileSelected { input } | ValidationError::WrongType { input, .. } => {
                *input
            }
        }
    }

    /// Localized rejection reason.
    pub fn user_message(&self, messages: &MessageTable) -> String {
        match self {
            ValidationError::NoFileSelected { input } => messages.render(
                MessageKey::NoFileSelected,
                &[("input", messages.get(input.message_key()))],
            ),
            ValidationError::WrongType {
                input: InputKind::Project,
                expected,
                ..
            } => messages.render(
                MessageKey::ProjectWrongType,
                &[("extension", &expected.trim_start_matches('.').to_uppercase())],
            ),
            ValidationError::WrongType {
                input: InputKind::Transcript,
                name,
                expected,
            } => messages.render(
                MessageKey::TranscriptWrongType,
                &[("name", name), ("expected", expected)],
            ),
        }
    }
}

/// Both run inputs, accepted by a [`FileValidator`].
///
/// Only [`FileValidator::validate_inputs`] constructs this, so holding one
/// proves a run may start.
#[derive(Debug, Clone)]
pub struct ValidatedInputs {
    project: InputFile,
    transcript: InputFile,
}

impl ValidatedInputs {
    pub fn project(&self) -> &InputFile {
        &self.project
    }

    pub fn transcript(&self) -> &InputFile {
        &self.transcript
    }

    pub(crate) fn into_parts(self) -> (InputFile, InputFile) {
        (self.project, self.transcript)
    }
}

/// Accept/reject rules for the two inputs.
#[derive(Debug, Clone)]
pub struct FileValidator {
    /// Lowercase archive suffix including the dot, e.g. ".zip".
    project_suffix: String,
    /// Lowercase extensions without the dot.
    transcript_extensions: Vec<String>,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl FileValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        let normalize = |ext: &str| ext.trim().trim_start_matches('.').to_lowercase();

        Self {
            project_suffix: format!(".{}", normalize(&config.project_extension)),
            transcript_extensions: config
                .transcript_extensions
                .iter()
                .map(|ext| normalize(ext))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Accepts iff the name ends with the archive suffix.
    pub fn validate_project_file(&self, file: Option<&InputFile>) -> Result<(), ValidationError> {
        let file = file.ok_or(ValidationError::NoFileSelected {
            input: InputKind::Project,
        })?;

        if file.name.to_lowercase().ends_with(&self.project_suffix) {
            Ok(())
        } else {
            Err(ValidationError::WrongType {
                input: InputKind::Project,
                name: file.name.clone(),
                expected: self.project_suffix.clone(),
            })
        }
    }

    /// Accepts iff the extension is one of the recognized document types.
    pub fn validate_transcript_file(
        &self,
        file: Option<&InputFile>,
    ) -> Result<(), ValidationError> {
        let file = file.ok_or(ValidationError::NoFileSelected {
            input: InputKind::Transcript,
        })?;

        let accepted = file
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .is_some_and(|ext| self.transcript_extensions.contains(&ext));

        if accepted {
            Ok(())
        } else {
            Err(ValidationError::WrongType {
                input: InputKind::Transcript,
                name: file.name.clone(),
                expected: self
                    .transcript_extensions
                    .iter()
                    .map(|ext| format!(".{}", ext))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
    }

    /// Validate the file for one input slot.
    pub fn validate(&self, kind: InputKind, file: Option<&InputFile>) -> Result<(), ValidationError> {
        match kind {
            InputKind::Project => self.validate_project_file(file),
            InputKind::Transcript => self.validate_transcript_file(file),
        }
    }

    /// The start precondition: both inputs present and accepted.
    pub fn validate_inputs(
        &self,
        project: Option<InputFile>,
        transcript: Option<InputFile>,
    ) -> Result<ValidatedInputs, ValidationError> {
        self.validate_project_file(project.as_ref())?;
        self.validate_transcript_file(transcript.as_ref())?;

        match (project, transcript) {
            (Some(project), Some(transcript)) => Ok(ValidatedInputs {
                project,
                transcript,
            }),
            // Both were checked for presence above.
            (None, _) => Err(ValidationError::NoFileSelected {
                input: InputKind::Project,
            }),
            (_, None) => Err(ValidationError::NoFileSelected {
                input: InputKind::Transcript,
            }),
        }
    }
}
