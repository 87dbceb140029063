//! Projection of raw result payloads into displayable text.
//!
//! Projection is pure: the same value always yields the same text, and
//! projecting an already-projected text returns it unchanged.

use serde::Serialize;
use serde_json::Value;

use crate::messages::{MessageKey, MessageTable};
use crate::session::SessionState;

/// Placeholder used when no message table is at hand.
pub const DEFAULT_PLACEHOLDER: &str = "No data available";

/// Turns result values into display text.
#[derive(Debug, Clone)]
pub struct ResultsProjector {
    placeholder: String,
}

impl Default for ResultsProjector {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER)
    }
}

impl ResultsProjector {
    /// Create a projector with the given "no data" placeholder.
    ///
    /// A blank placeholder is replaced by [`DEFAULT_PLACEHOLDER`], otherwise
    /// re-projecting it would not be stable.
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        if placeholder.trim().is_empty() {
            return Self::default();
        }
        Self { placeholder }
    }

    /// Projector using the localized placeholder.
    pub fn from_messages(messages: &MessageTable) -> Self {
        Self::new(messages.get(MessageKey::NoData))
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Project one value.
    ///
    /// - null or blank text: the placeholder
    /// - text: verbatim (may carry markup for an external renderer)
    /// - anything else: indented JSON
    pub fn project(&self, value: &Value) -> String {
        match value {
            Value::Null => self.placeholder.clone(),
            Value::String(text) if text.trim().is_empty() => self.placeholder.clone(),
            Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

/// Project a value with the English placeholder.
pub fn project(value: &Value) -> String {
    ResultsProjector::default().project(value)
}

/// The rendered results of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    pub context: String,
    pub technical_todo: String,
    pub clarifications: String,
    pub output_location: Option<String>,
}

impl ResultsView {
    /// Build the view; `None` unless the session is `Done`.
    pub fn from_session(session: &SessionState, projector: &ResultsProjector) -> Option<Self> {
        if !session.is_done() {
            return None;
        }
        let results = session.results()?;

        Some(Self {
            context: projector.project(&results.context),
            technical_todo: projector.project(&results.technical_todo),
            clarifications: projector.project(&results.clarifications),
            output_location: session.output_location().map(|l| l.to_string()),
        })
    }
}
