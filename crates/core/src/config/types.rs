use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::messages::Locale;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Remote conversion service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Base URL of the conversion API (e.g., "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 300).
    /// Generation goes through a language model and routinely takes minutes.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Server-side directory under which imported projects are unpacked.
    /// The parse stage receives `<project_root>/<session id>`.
    #[serde(default = "default_project_root")]
    pub project_root: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            project_root: default_project_root(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_project_root() -> String {
    "/tmp".to_string()
}

/// Accepted input file types
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Archive extension required for the project input.
    #[serde(default = "default_project_extension")]
    pub project_extension: String,
    /// Document extensions accepted for the transcript input.
    #[serde(default = "default_transcript_extensions")]
    pub transcript_extensions: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            project_extension: default_project_extension(),
            transcript_extensions: default_transcript_extensions(),
        }
    }
}

fn default_project_extension() -> String {
    "zip".to_string()
}

fn default_transcript_extensions() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string(), "docx".to_string()]
}

/// Presentation configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
    /// Optional TOML file overriding entries of the built-in message table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages_path: Option<PathBuf>,
}

/// Export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Directory the plain-text export is written to.
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}
