//! Localized user-facing strings.
//!
//! Every message shown to a user is looked up here by [`MessageKey`] and
//! [`Locale`], so the pipeline logic itself carries no display text.
//! The built-in table is embedded from `messages.toml`; deployments can
//! override individual entries with their own TOML file.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const BUILTIN_TABLE: &str = include_str!("messages.toml");

type Entries = HashMap<Locale, HashMap<String, String>>;

static BUILTIN: Lazy<Entries> =
    Lazy::new(|| parse_entries(BUILTIN_TABLE).expect("built-in message table is valid TOML"));

/// Errors raised while loading a message table.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    #[error("failed to read message table {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse message table: {0}")]
    Parse(String),
}

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            other => Err(MessageError::UnknownLocale(other.to_string())),
        }
    }
}

/// Keys of the message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    InputProject,
    InputTranscript,
    NoFileSelected,
    ProjectWrongType,
    TranscriptWrongType,
    ErrorEmptyContent,
    ErrorEmptyOutput,
    ErrorProtocol,
    ErrorTransport,
    StageFailed,
    StageUploading,
    StageParsing,
    StageGenerating,
    StagePersisting,
    Busy,
    RunCompleted,
    NoData,
    SectionContext,
    SectionTodo,
    SectionClarifications,
    GeneratedOn,
    OutputPath,
    NotAvailable,
    ExportSaved,
}

impl MessageKey {
    pub const ALL: [MessageKey; 24] = [
        MessageKey::InputProject,
        MessageKey::InputTranscript,
        MessageKey::NoFileSelected,
        MessageKey::ProjectWrongType,
        MessageKey::TranscriptWrongType,
        MessageKey::ErrorEmptyContent,
        MessageKey::ErrorEmptyOutput,
        MessageKey::ErrorProtocol,
        MessageKey::ErrorTransport,
        MessageKey::StageFailed,
        MessageKey::StageUploading,
        MessageKey::StageParsing,
        MessageKey::StageGenerating,
        MessageKey::StagePersisting,
        MessageKey::Busy,
        MessageKey::RunCompleted,
        MessageKey::NoData,
        MessageKey::SectionContext,
        MessageKey::SectionTodo,
        MessageKey::SectionClarifications,
        MessageKey::GeneratedOn,
        MessageKey::OutputPath,
        MessageKey::NotAvailable,
        MessageKey::ExportSaved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::InputProject => "input_project",
            MessageKey::InputTranscript => "input_transcript",
            MessageKey::NoFileSelected => "no_file_selected",
            MessageKey::ProjectWrongType => "project_wrong_type",
            MessageKey::TranscriptWrongType => "transcript_wrong_type",
            MessageKey::ErrorEmptyContent => "error_empty_content",
            MessageKey::ErrorEmptyOutput => "error_empty_output",
            MessageKey::ErrorProtocol => "error_protocol",
            MessageKey::ErrorTransport => "error_transport",
            MessageKey::StageFailed => "stage_failed",
            MessageKey::StageUploading => "stage_uploading",
            MessageKey::StageParsing => "stage_parsing",
            MessageKey::StageGenerating => "stage_generating",
            MessageKey::StagePersisting => "stage_persisting",
            MessageKey::Busy => "busy",
            MessageKey::RunCompleted => "run_completed",
            MessageKey::NoData => "no_data",
            MessageKey::SectionContext => "section_context",
            MessageKey::SectionTodo => "section_todo",
            MessageKey::SectionClarifications => "section_clarifications",
            MessageKey::GeneratedOn => "generated_on",
            MessageKey::OutputPath => "output_path",
            MessageKey::NotAvailable => "not_available",
            MessageKey::ExportSaved => "export_saved",
        }
    }
}

/// A message table bound to one display locale.
#[derive(Debug, Clone)]
pub struct MessageTable {
    locale: Locale,
    entries: Entries,
}

impl MessageTable {
    /// Built-in table for the given locale.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            entries: BUILTIN.clone(),
        }
    }

    /// Merge entries from a TOML string over the current ones.
    pub fn with_overrides_str(mut self, toml_str: &str) -> Result<Self, MessageError> {
        for (locale, messages) in parse_entries(toml_str)? {
            self.entries.entry(locale).or_default().extend(messages);
        }
        Ok(self)
    }

    /// Merge entries from a TOML file over the current ones.
    pub fn with_overrides_file(self, path: &Path) -> Result<Self, MessageError> {
        let content = std::fs::read_to_string(path).map_err(|e| MessageError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.with_overrides_str(&content)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Raw message for a key.
    ///
    /// Falls back to English, then to the key name itself.
    pub fn get(&self, key: MessageKey) -> &str {
        let lookup = |locale: Locale| {
            self.entries
                .get(&locale)
                .and_then(|m| m.get(key.as_str()))
                .map(String::as_str)
        };
        lookup(self.locale)
            .or_else(|| lookup(Locale::En))
            .unwrap_or(key.as_str())
    }

    /// Message for a key with `{name}` placeholders substituted.
    ///
    /// Substitution is a single pass over the template: text coming from an
    /// argument is never itself scanned for placeholders.
    pub fn render(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        let template = self.get(key);
        let mut text = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            text.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let value = after.find('}').and_then(|close| {
                let name = &after[..close];
                args.iter()
                    .find(|(arg, _)| *arg == name)
                    .map(|(_, value)| (*value, close))
            });

            match value {
                Some((value, close)) => {
                    text.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    text.push('{');
                    rest = after;
                }
            }
        }

        text.push_str(rest);
        text
    }
}

impl Default for MessageTable {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

fn parse_entries(toml_str: &str) -> Result<Entries, MessageError> {
    let raw: HashMap<String, HashMap<String, String>> =
        toml::from_str(toml_str).map_err(|e| MessageError::Parse(e.to_string()))?;

    let mut entries = Entries::new();
    for (locale, messages) in raw {
        match locale.parse::<Locale>() {
            Ok(locale) => {
                entries.insert(locale, messages);
            }
            Err(_) => warn!(locale = %locale, "Ignoring messages for unknown locale"),
        }
    }
    Ok(entries)
}
