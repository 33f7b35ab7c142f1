use crate::llm::client::{LLMClient, LLMResponse, ModelParams, OutputSchema};
use crate::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionResponseMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObject, ResponseFormat,
        ResponseFormatJsonSchema, ToolChoiceOptions,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Client for OpenAI-compatible chat completion endpoints
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    params: ModelParams,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String, params: ModelParams) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.trim_end_matches('/'));

        Self {
            client: Client::with_config(config),
            model,
            params,
        }
    }

    fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
        let converted = match message {
            Message::System { content } => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(content.clone()),
            ),
            Message::Human { content } => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(content.clone()),
            ),
            Message::Ai {
                content,
                tool_calls,
            } => {
                let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
                if !content.is_empty() || tool_calls.is_empty() {
                    assistant.content(content.clone());
                }
                if !tool_calls.is_empty() {
                    let calls: Vec<ChatCompletionMessageToolCalls> = tool_calls
                        .iter()
                        .map(|tc| {
                            ChatCompletionMessageToolCalls::Function(
                                ChatCompletionMessageToolCall {
                                    id: tc.id.clone(),
                                    function: FunctionCall {
                                        name: tc.name.clone(),
                                        arguments: tc.arguments.to_string(),
                                    },
                                },
                            )
                        })
                        .collect();
                    assistant.tool_calls(calls);
                }
                ChatCompletionRequestMessage::Assistant(
                    assistant
                        .build()
                        .map_err(|e| AppError::LLM(format!("Failed to build message: {}", e)))?,
                )
            }
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => ChatCompletionRequestMessage::Tool(
                ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(tool_call_id.clone())
                    .content(content.clone())
                    .build()
                    .map_err(|e| AppError::LLM(format!("Failed to build message: {}", e)))?,
            ),
        };
        Ok(converted)
    }

    /// Request carrying the history and sampling parameters; a per-call
    /// ceiling overrides the configured `max_tokens`.
    fn base_request(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<CreateChatCompletionRequestArgs> {
        let chat_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(chat_messages);
        if let Some(temperature) = self.params.temperature {
            args.temperature(temperature);
        }
        if let Some(ceiling) = max_tokens.or(self.params.max_tokens) {
            args.max_completion_tokens(ceiling);
        }
        Ok(args)
    }

    fn build(args: &CreateChatCompletionRequestArgs) -> Result<CreateChatCompletionRequest> {
        args.build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))
    }

    async fn send(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<(ChatCompletionResponseMessage, String)> {
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))?;

        let finish_reason = choice
            .finish_reason
            .and_then(|reason| serde_json::to_value(reason).ok())
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        Ok((choice.message, finish_reason))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_history(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = Self::build(&self.base_request(messages, max_tokens)?)?;
        let (message, _) = self.send(request).await?;
        message
            .content
            .ok_or_else(|| AppError::LLM("No content in OpenAI response".to_string()))
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let mut args = self.base_request(messages, None)?;
        if !tools.is_empty() {
            let openai_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|tool| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: tool.name.clone(),
                            description: Some(tool.description.clone()),
                            parameters: Some(tool.parameters.clone()),
                            strict: None,
                        },
                    })
                })
                .collect();
            args.tools(openai_tools)
                .tool_choice(ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto));
        }

        let (message, finish_reason) = self.send(Self::build(&args)?).await?;

        // Custom (non-function) tool calls have no counterpart in the registry.
        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|call| match call {
                ChatCompletionMessageToolCalls::Function(call) => Some(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: serde_json::from_str(&call.function.arguments)
                        .unwrap_or(json!({})),
                }),
                _ => None,
            })
            .collect();

        Ok(LLMResponse {
            content: message.content.unwrap_or_default(),
            tool_calls,
            finish_reason,
        })
    }

    async fn generate_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<Value> {
        let mut args = self.base_request(messages, None)?;
        args.response_format(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: schema.name.clone(),
                schema: Some(schema.schema.clone()),
                strict: None,
            },
        });

        let (message, _) = self.send(Self::build(&args)?).await?;
        let content = message
            .content
            .ok_or_else(|| AppError::LLM("No content in OpenAI response".to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            AppError::LLM(format!(
                "OpenAI returned invalid JSON for '{}': {}",
                schema.name, e
            ))
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
