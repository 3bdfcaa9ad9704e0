//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple agent logic from any specific LLM SDK. A
//! [`Transcript`] owns the ordered messages of one agent execution and
//! enforces the conversation shape the completion API expects.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::tool::{ToolCall, ToolDefinition, ToolResult};
use crate::error::AgentError;

/// A single chat message, tagged by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    /// System instructions.
    System {
        /// Prompt text.
        content: String,
    },
    /// User input.
    User {
        /// Query text.
        content: String,
    },
    /// Assistant turn, optionally requesting tool calls.
    Assistant {
        /// Text produced alongside (or instead of) tool calls.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Tool calls requested by the model.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call.
    Tool {
        /// Id of the call this message answers.
        tool_call_id: String,
        /// Serialized JSON payload.
        content: String,
    },
}

/// Ordered conversation for one agent execution.
///
/// The first message is always [`ChatMessage::System`]. Messages are only
/// appended. A tool result is accepted only if it answers a call carried by
/// the most recent assistant message that has not been answered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    pending: Vec<String>,
}

impl Transcript {
    /// Seeds a transcript with the system prompt and the user query.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            messages: vec![
                ChatMessage::System {
                    content: system_prompt.into(),
                },
                ChatMessage::User {
                    content: user_query.into(),
                },
            ],
            pending: Vec::new(),
        }
    }

    /// Returns the messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Iterates over the messages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    /// Returns the number of messages.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always `false`: a transcript starts with two messages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Call ids issued by the last assistant message and not yet answered.
    #[must_use]
    pub fn pending_calls(&self) -> &[String] {
        &self.pending
    }

    /// Appends an assistant message. Its tool calls become the pending set.
    pub fn push_assistant(&mut self, content: Option<String>, tool_calls: Vec<ToolCall>) {
        self.pending = tool_calls.iter().map(|c| c.id.clone()).collect();
        self.messages.push(ChatMessage::Assistant {
            content,
            tool_calls,
        });
    }

    /// Appends a tool result.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OrphanToolResult`] if the result does not answer
    /// a pending call.
    pub fn push_tool_result(&mut self, result: ToolResult) -> Result<(), AgentError> {
        let Some(pos) = self.pending.iter().position(|id| *id == result.tool_call_id) else {
            return Err(AgentError::OrphanToolResult {
                id: result.tool_call_id,
            });
        };
        self.pending.remove(pos);
        self.messages.push(ChatMessage::Tool {
            tool_call_id: result.tool_call_id,
            content: result.content,
        });
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gpt-4-turbo-preview").
    pub model: String,
    /// Conversation so far.
    pub messages: Transcript,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Tool definitions available to the model.
    pub tools: Vec<ToolDefinition>,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(rhs.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(rhs.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
    }
}

/// What the model produced: a final answer or a request to run tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Final text answer.
    Text(String),
    /// One or more tool calls, possibly with accompanying text.
    ToolCalls {
        /// Text emitted alongside the calls.
        content: Option<String>,
        /// Requested calls, in order.
        calls: Vec<ToolCall>,
    },
}

impl Reply {
    /// Classifies raw completion output. An empty call list is a text reply.
    #[must_use]
    pub fn from_parts(content: Option<String>, calls: Vec<ToolCall>) -> Self {
        if calls.is_empty() {
            Self::Text(content.unwrap_or_default())
        } else {
            Self::ToolCalls { content, calls }
        }
    }
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Model output.
    pub reply: Reply,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Finish reason from the model (e.g., `"stop"`, `"tool_calls"`).
    pub finish_reason: Option<String>,
}
