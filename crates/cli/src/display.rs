//! Terminal rendering of the controller's display events.

use std::sync::Arc;

use reunion_core::{
    DisplaySink, MessageKey, MessageTable, ResultsView, RunState, SessionId, StateUpdateCallback,
};
use tracing::debug;

const RULE_WIDTH: usize = 50;

/// Writes results to stdout and everything else to stderr.
pub struct TerminalDisplay {
    messages: MessageTable,
}

impl TerminalDisplay {
    pub fn new(messages: MessageTable) -> Self {
        Self { messages }
    }
}

impl DisplaySink for TerminalDisplay {
    fn set_start_enabled(&mut self, enabled: bool) {
        debug!(enabled, "Start action toggled");
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            eprintln!("{}", self.messages.get(MessageKey::Busy));
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn show_notice(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn show_results(&mut self, view: &ResultsView) {
        print!("{}", render_results(view, &self.messages));
    }

    fn reset_inputs(&mut self) {}
}

/// The three result sections followed by the output location.
pub fn render_results(view: &ResultsView, messages: &MessageTable) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    for (key, body) in [
        (MessageKey::SectionContext, &view.context),
        (MessageKey::SectionTodo, &view.technical_todo),
        (MessageKey::SectionClarifications, &view.clarifications),
    ] {
        out.push_str(&format!("{}\n{}\n{}\n\n", messages.get(key), rule, body));
    }

    out.push_str(&format!(
        "{}: {}\n",
        messages.get(MessageKey::OutputPath),
        view.output_location
            .as_deref()
            .unwrap_or_else(|| messages.get(MessageKey::NotAvailable))
    ));
    out
}

/// Prints each stage as it starts.
pub fn progress_printer(messages: MessageTable) -> StateUpdateCallback {
    Arc::new(move |session_id: &SessionId, state: &RunState| {
        if let Some(stage) = state.stage() {
            eprintln!("[{}] {}...", session_id, messages.get(stage.message_key()));
        }
    })
}
