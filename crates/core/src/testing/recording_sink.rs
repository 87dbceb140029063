//! Display sink that records what would have been shown.

use crate::controller::DisplaySink;
use crate::projector::ResultsView;

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    StartEnabled(bool),
    Busy(bool),
    Error(String),
    Notice(String),
    Results(ResultsView),
    InputsReset,
}

/// A `DisplaySink` that keeps every event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<DisplayEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Last start-enabled value pushed, if any.
    pub fn start_enabled(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|event| match event {
            DisplayEvent::StartEnabled(enabled) => Some(*enabled),
            _ => None,
        })
    }

    /// Whether the busy indicator is currently shown.
    pub fn is_busy(&self) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|event| match event {
                DisplayEvent::Busy(busy) => Some(*busy),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Notice(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Most recently shown results.
    pub fn last_results(&self) -> Option<&ResultsView> {
        self.events.iter().rev().find_map(|event| match event {
            DisplayEvent::Results(view) => Some(view),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DisplaySink for RecordingSink {
    fn set_start_enabled(&mut self, enabled: bool) {
        self.events.push(DisplayEvent::StartEnabled(enabled));
    }

    fn set_busy(&mut self, busy: bool) {
        self.events.push(DisplayEvent::Busy(busy));
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(DisplayEvent::Error(message.to_string()));
    }

    fn show_notice(&mut self, message: &str) {
        self.events.push(DisplayEvent::Notice(message.to_string()));
    }

    fn show_results(&mut self, view: &ResultsView) {
        self.events.push(DisplayEvent::Results(view.clone()));
    }

    fn reset_inputs(&mut self) {
        self.events.push(DisplayEvent::InputsReset);
    }
}
