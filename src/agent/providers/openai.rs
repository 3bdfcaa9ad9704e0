//! `OpenAI` provider implementation using the `async-openai` crate.
//!
//! Supports any `OpenAI`-compatible API (`OpenAI`, Azure, local proxies)
//! via the base URL override in [`AgentConfig`].

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, ChatCompletionTool,
    ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequest,
    CreateChatCompletionResponse, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use tracing::warn;

use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, Reply, TokenUsage};
use crate::agent::provider::LlmProvider;
use crate::agent::tool::ToolCall;
use crate::error::AgentError;

/// Delay added per retry attempt.
const RETRY_STEP: Duration = Duration::from_millis(500);

/// `OpenAI`-compatible LLM provider.
///
/// Wraps the `async-openai` client for chat completions. Transport failures
/// are retried up to `max_retries` times with linearly growing delays; API
/// errors are returned immediately.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    max_retries: u32,
}

impl OpenAiProvider {
    /// Creates a new provider from agent configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http),
            max_retries: config.max_retries,
        })
    }

    /// Converts our message type to the `OpenAI` SDK type.
    fn convert_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg {
            ChatMessage::System { content } => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(content.clone()),
                    name: None,
                })
            }
            ChatMessage::User { content } => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(content.clone()),
                    name: None,
                })
            }
            ChatMessage::Assistant {
                content,
                tool_calls,
            } => {
                let tool_calls = if tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        tool_calls
                            .iter()
                            .map(|tc| ChatCompletionMessageToolCall {
                                id: tc.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                };

                let content = content
                    .as_ref()
                    .filter(|c| !c.is_empty())
                    .map(|c| ChatCompletionRequestAssistantMessageContent::Text(c.clone()));

                #[allow(deprecated)]
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content,
                    name: None,
                    tool_calls,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
            ChatMessage::Tool {
                tool_call_id,
                content,
            } => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                content: ChatCompletionRequestToolMessageContent::Text(content.clone()),
                tool_call_id: tool_call_id.clone(),
            }),
        }
    }

    /// Builds an `OpenAI` chat completion request from our generic request.
    fn build_request(request: &ChatRequest) -> CreateChatCompletionRequest {
        let messages: Vec<_> = request.messages.iter().map(Self::convert_message).collect();

        let tools: Option<Vec<ChatCompletionTool>> = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|td| ChatCompletionTool {
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionObject {
                            name: td.name.clone(),
                            description: Some(td.description.clone()),
                            parameters: Some(td.parameters.clone()),
                            strict: None,
                        },
                    })
                    .collect(),
            )
        };
        let tool_choice = tools.as_ref().map(|_| ChatCompletionToolChoiceOption::Auto);

        CreateChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
            tools,
            tool_choice,
            ..Default::default()
        }
    }

    /// Converts an SDK response into our generic response.
    fn parse_response(response: CreateChatCompletionResponse) -> Result<ChatResponse, AgentError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ResponseParse {
                message: "completion returned no choices".to_string(),
            })?;

        let calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let finish_reason = choice
            .finish_reason
            .map(|fr| format!("{fr:?}").to_lowercase());

        let usage = response
            .usage
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });

        Ok(ChatResponse {
            reply: Reply::from_parts(choice.message.content, calls),
            usage,
            finish_reason,
        })
    }
}

fn map_error(err: OpenAIError) -> AgentError {
    match err {
        OpenAIError::Reqwest(e) => AgentError::ApiRequest {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        },
        OpenAIError::ApiError(api) => AgentError::ApiRequest {
            message: api.message,
            status: None,
        },
        OpenAIError::JSONDeserialize(e) => AgentError::ResponseParse {
            message: e.to_string(),
        },
        other => AgentError::ApiRequest {
            message: other.to_string(),
            status: None,
        },
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &"<async-openai::Client>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let openai_request = Self::build_request(request);
        let mut attempt = 0;

        let response = loop {
            match self.client.chat().create(openai_request.clone()).await {
                Ok(response) => break response,
                Err(OpenAIError::Reqwest(e)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "completion request failed, retrying"
                    );
                    tokio::time::sleep(RETRY_STEP * attempt).await;
                }
                Err(e) => return Err(map_error(e)),
            }
        };

        Self::parse_response(response)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::message::Transcript;
    use crate::agent::tool::ToolDefinition;

    fn request(tools: Vec<ToolDefinition>) -> ChatRequest {
        ChatRequest {
            model: "gpt-4-turbo-preview".to_string(),
            messages: Transcript::new("system", "test"),
            temperature: Some(0.7),
            max_tokens: Some(100),
            tools,
        }
    }

    #[test]
    fn test_convert_system_message() {
        let msg = ChatMessage::System {
            content: "test".into(),
        };
        let converted = OpenAiProvider::convert_message(&msg);
        assert!(matches!(converted, ChatCompletionRequestMessage::System(_)));
    }

    #[test]
    fn test_convert_user_message() {
        let msg = ChatMessage::User {
            content: "hello".into(),
        };
        let converted = OpenAiProvider::convert_message(&msg);
        assert!(matches!(converted, ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_convert_tool_message() {
        let msg = ChatMessage::Tool {
            tool_call_id: "call_123".into(),
            content: "{}".into(),
        };
        let converted = OpenAiProvider::convert_message(&msg);
        if let ChatCompletionRequestMessage::Tool(t) = converted {
            assert_eq!(t.tool_call_id, "call_123");
        } else {
            panic!("Expected Tool message");
        }
    }

    #[test]
    fn test_convert_assistant_with_tool_calls() {
        let msg = ChatMessage::Assistant {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "list_indices".to_string(),
                arguments: "{}".to_string(),
            }],
        };
        let converted = OpenAiProvider::convert_message(&msg);
        if let ChatCompletionRequestMessage::Assistant(a) = converted {
            assert!(a.content.is_none());
            let tcs = a.tool_calls.as_ref().map_or(0, Vec::len);
            assert_eq!(tcs, 1);
        } else {
            panic!("Expected Assistant message");
        }
    }

    #[test]
    fn test_build_request_without_tools() {
        let built = OpenAiProvider::build_request(&request(Vec::new()));
        assert_eq!(built.messages.len(), 2);
        assert!(built.tools.is_none());
        assert!(built.tool_choice.is_none());
        assert_eq!(built.temperature, Some(0.7));
        assert_eq!(built.max_completion_tokens, Some(100));
    }

    #[test]
    fn test_build_request_with_tools_sets_auto_choice() {
        let built = OpenAiProvider::build_request(&request(vec![ToolDefinition {
            name: "list_indices".to_string(),
            description: "List indices".to_string(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }]));
        assert_eq!(built.tools.as_ref().map_or(0, Vec::len), 1);
        assert!(matches!(
            built.tool_choice,
            Some(ChatCompletionToolChoiceOption::Auto)
        ));
    }

    fn response(json: serde_json::Value) -> CreateChatCompletionResponse {
        serde_json::from_value(json).unwrap_or_else(|e| panic!("bad fixture: {e}"))
    }

    #[test]
    fn test_parse_response_text() {
        let parsed = OpenAiProvider::parse_response(response(serde_json::json!({
            "id": "x", "object": "chat.completion", "created": 0, "model": "m",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "All done."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        })))
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(parsed.reply, Reply::Text("All done.".into()));
        assert_eq!(parsed.usage.total_tokens, 5);
        assert_eq!(parsed.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_response_tool_calls() {
        let parsed = OpenAiProvider::parse_response(response(serde_json::json!({
            "id": "x", "object": "chat.completion", "created": 0, "model": "m",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "list_indices", "arguments": "{}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
        let Reply::ToolCalls { calls, .. } = parsed.reply else {
            panic!("expected tool calls");
        };
        assert_eq!(calls[0].name, "list_indices");
    }

    #[test]
    fn test_parse_response_without_choices() {
        let result = OpenAiProvider::parse_response(response(serde_json::json!({
            "id": "x", "object": "chat.completion", "created": 0, "model": "m",
            "choices": []
        })));
        assert!(matches!(result, Err(AgentError::ResponseParse { .. })));
    }
}
