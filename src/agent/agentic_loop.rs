//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the round limit is
//! reached.

use tracing::{debug, warn};

use super::executor::ToolExecutor;
use super::message::{ChatRequest, Reply, TokenUsage};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// How a loop run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model answered without requesting tools.
    Final {
        /// Answer text.
        content: String,
        /// Completion requests made.
        rounds: usize,
        /// Usage summed over every round.
        usage: TokenUsage,
    },
    /// The model was still requesting tools when the round limit hit.
    Exhausted {
        /// Completion requests made (equals the limit).
        rounds: usize,
        /// Usage summed over every round.
        usage: TokenUsage,
    },
}

impl LoopOutcome {
    /// Completion requests made.
    #[must_use]
    pub const fn rounds(&self) -> usize {
        match self {
            Self::Final { rounds, .. } | Self::Exhausted { rounds, .. } => *rounds,
        }
    }

    /// Usage summed over every round.
    #[must_use]
    pub const fn usage(&self) -> TokenUsage {
        match self {
            Self::Final { usage, .. } | Self::Exhausted { usage, .. } => *usage,
        }
    }
}

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Each round makes one completion request. Tool calls within a round are
/// executed one at a time, in the order the model listed them, and every
/// result is appended before the next request.
///
/// # Arguments
///
/// * `provider` - LLM provider to call.
/// * `request` - Initial chat request (its transcript grows in place).
/// * `executor` - Dispatches tool calls to the backend.
/// * `max_iterations` - Maximum number of completion rounds.
///
/// # Errors
///
/// Propagates provider errors immediately. Exhausting the round limit is
/// not an error; it yields [`LoopOutcome::Exhausted`].
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor<'_>,
    max_iterations: usize,
) -> Result<LoopOutcome, AgentError> {
    let mut usage = TokenUsage::default();

    for round in 1..=max_iterations {
        debug!(round, max_iterations, "requesting completion");
        let response = provider.chat(request).await?;
        usage += response.usage;

        let (content, calls) = match response.reply {
            Reply::Text(content) => {
                debug!(round, "agentic loop completed with final text response");
                return Ok(LoopOutcome::Final {
                    content,
                    rounds: round,
                    usage,
                });
            }
            Reply::ToolCalls { content, calls } => (content, calls),
        };

        debug!(round, tool_count = calls.len(), "executing tool calls");
        request.messages.push_assistant(content, calls.clone());

        for call in &calls {
            let result = executor.execute(call).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request.messages.push_tool_result(result)?;
        }
    }

    warn!(max_iterations, "agentic loop reached the round limit");
    Ok(LoopOutcome::Exhausted {
        rounds: max_iterations,
        usage,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::agent::message::{ChatMessage, Transcript};
    use crate::agent::tool::ToolSet;
    use crate::testing::{MockBackend, ScriptedProvider, Step};

    fn request(tools: &ToolSet) -> ChatRequest {
        ChatRequest {
            model: "test".to_string(),
            messages: Transcript::new("You are a test agent.", "List the indices."),
            temperature: Some(0.0),
            max_tokens: Some(1024),
            tools: tools.definitions().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_agentic_loop_no_tools() {
        let backend = MockBackend::default();
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::new(vec![Step::Text("Nothing to do.")]);
        let mut req = request(&tools);

        let outcome = agentic_loop(&provider, &mut req, &executor, 5)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(
            outcome,
            LoopOutcome::Final {
                content: "Nothing to do.".to_string(),
                rounds: 1,
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                },
            }
        );
        assert_eq!(req.messages.len(), 2);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_agentic_loop_single_tool_round() {
        let backend = MockBackend::default().with_indices(&["products"]);
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::new(vec![
            Step::Tools(vec![("list_indices", json!({}))]),
            Step::Text("There is one index: products."),
        ]);
        let mut req = request(&tools);

        let outcome = agentic_loop(&provider, &mut req, &executor, 5)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.rounds(), 2);
        assert_eq!(outcome.usage().total_tokens, 30);
        // system + user + assistant(tool_calls) + tool(result)
        assert_eq!(req.messages.len(), 4);
        let ChatMessage::Tool { content, .. } = &req.messages.messages()[3] else {
            panic!("expected tool message");
        };
        assert!(content.contains("products"));

        // The second request carried the tool result.
        let requests = provider.requests();
        assert_eq!(requests[1].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_agentic_loop_calls_run_in_order() {
        let backend = MockBackend::default();
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::new(vec![
            Step::Tools(vec![
                ("get_index_info", json!({"index": "a"})),
                ("get_index_info", json!({"index": "b"})),
            ]),
            Step::Text("done"),
        ]);
        let mut req = request(&tools);

        agentic_loop(&provider, &mut req, &executor, 5)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        let indices: Vec<String> = backend.calls().into_iter().map(|c| c.index).collect();
        assert_eq!(indices, vec!["a", "b"]);
        let ids: Vec<&str> = req
            .messages
            .iter()
            .filter_map(|m| match m {
                ChatMessage::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["call_1_0", "call_1_1"]);
    }

    #[tokio::test]
    async fn test_agentic_loop_exhausts_round_limit() {
        let backend = MockBackend::default();
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::always_tools();
        let mut req = request(&tools);

        let outcome = agentic_loop(&provider, &mut req, &executor, 3)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert!(matches!(outcome, LoopOutcome::Exhausted { rounds: 3, .. }));
        assert_eq!(provider.requests().len(), 3);
        // 2 initial + 3 rounds * (assistant + tool)
        assert_eq!(req.messages.len(), 8);
    }

    #[tokio::test]
    async fn test_agentic_loop_unknown_tool_continues() {
        let backend = MockBackend::default();
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::new(vec![
            Step::Tools(vec![("create_index", json!({"index": "x"}))]),
            Step::Text("I cannot create indices."),
        ]);
        let mut req = request(&tools);

        let outcome = agentic_loop(&provider, &mut req, &executor, 5)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert!(matches!(outcome, LoopOutcome::Final { rounds: 2, .. }));
        let ChatMessage::Tool { content, .. } = &req.messages.messages()[3] else {
            panic!("expected tool message");
        };
        assert_eq!(content, r#"{"error":"Unknown tool: create_index"}"#);
    }

    #[tokio::test]
    async fn test_agentic_loop_provider_error_aborts() {
        let backend = MockBackend::default();
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::new(vec![
            Step::Tools(vec![("list_indices", json!({}))]),
            Step::Fail("rate limited"),
        ]);
        let mut req = request(&tools);

        let result = agentic_loop(&provider, &mut req, &executor, 5).await;
        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_agentic_loop_zero_rounds() {
        let backend = MockBackend::default();
        let tools = ToolSet::search_tools();
        let executor = ToolExecutor::new(&backend, &tools);
        let provider = ScriptedProvider::new(vec![Step::Text("unused")]);
        let mut req = request(&tools);

        let outcome = agentic_loop(&provider, &mut req, &executor, 0)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));
        assert!(matches!(outcome, LoopOutcome::Exhausted { rounds: 0, .. }));
        assert!(provider.requests().is_empty());
    }
}
