use crate::llm::client::{LLMClient, LLMResponse, ModelParams, OutputSchema};
use crate::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Client for the Ollama `/api/chat` endpoint
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    params: ModelParams,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, params: ModelParams) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            params,
        }
    }

    fn to_wire_message(message: &Message) -> Value {
        match message {
            Message::System { content } => json!({"role": "system", "content": content}),
            Message::Human { content } => json!({"role": "user", "content": content}),
            Message::Ai {
                content,
                tool_calls,
            } => {
                if tool_calls.is_empty() {
                    json!({"role": "assistant", "content": content})
                } else {
                    // Assistant with tool calls
                    let calls: Vec<Value> = tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "function": {
                                    "name": tc.name,
                                    "arguments": tc.arguments
                                }
                            })
                        })
                        .collect();
                    json!({"role": "assistant", "content": content, "tool_calls": calls})
                }
            }
            Message::Tool { name, content, .. } => {
                json!({"role": "tool", "tool_name": name, "content": content})
            }
        }
    }

    fn base_request(&self, messages: &[Message], max_tokens: Option<u32>) -> Value {
        let wire: Vec<Value> = messages.iter().map(Self::to_wire_message).collect();
        let mut options = json!({});
        if let Some(temperature) = self.params.temperature {
            options["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = max_tokens.or(self.params.max_tokens) {
            options["num_predict"] = json!(max_tokens);
        }
        json!({
            "model": self.model,
            "messages": wire,
            "stream": false,
            "options": options
        })
    }

    async fn send(&self, body: Value) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!("Ollama error ({}): {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid Ollama response: {}", e)))
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_history(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let response = self.send(self.base_request(messages, max_tokens)).await?;
        Ok(response.message.content)
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let mut body = self.base_request(messages, None);
        if !tools.is_empty() {
            let wire_tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters
                        }
                    })
                })
                .collect();
            body["tools"] = json!(wire_tools);
        }

        let response = self.send(body).await?;

        // Ollama does not assign ids to tool calls; tool results are matched by id
        // downstream, so every call gets a fresh one here.
        let tool_calls: Vec<ToolCall> = response
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                name: call.function.name,
                arguments: if call.function.arguments.is_null() {
                    json!({})
                } else {
                    call.function.arguments
                },
            })
            .collect();

        let finish_reason = if tool_calls.is_empty() {
            response.done_reason.unwrap_or_else(|| "stop".to_string())
        } else {
            "tool_calls".to_string()
        };

        Ok(LLMResponse {
            content: response.message.content,
            tool_calls,
            finish_reason,
        })
    }

    async fn generate_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<Value> {
        let mut body = self.base_request(messages, None);
        body["format"] = schema.schema.clone();

        let response = self.send(body).await?;
        serde_json::from_str(&response.message.content).map_err(|e| {
            AppError::LLM(format!(
                "Ollama returned invalid JSON for '{}': {}",
                schema.name, e
            ))
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
