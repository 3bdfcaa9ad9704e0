//! Output formatting for CLI answers.

use serde_json::json;

use crate::agent::{AgentKind, AgentResponse};
use crate::error::CommandError;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain answer text.
    #[default]
    Text,
    /// One JSON object per answer.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything other than `json` is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Renders one agent answer, newline-terminated.
///
/// JSON output carries `agent`, `status`, `rounds` and `response`.
pub fn format_answer(
    kind: AgentKind,
    response: &AgentResponse,
    format: OutputFormat,
) -> Result<String, CommandError> {
    match format {
        OutputFormat::Text => Ok(format!("{}\n", response.content)),
        OutputFormat::Json => {
            let value = json!({
                "agent": kind,
                "status": response.status,
                "rounds": response.rounds,
                "response": response.content,
            });
            serde_json::to_string_pretty(&value)
                .map(|s| s + "\n")
                .map_err(|e| CommandError::OutputFormat(e.to_string()))
        }
    }
}
