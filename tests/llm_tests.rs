//! LLM client tests against mocked provider APIs
//!
//! wiremock stands in for the OpenAI and Ollama HTTP endpoints so the request
//! bodies and response parsing of both clients can be checked offline.

use ares_research::llm::client::{generate_typed, ModelParams};
use ares_research::llm::{LLMClient, Provider};
use ares_research::types::{Message, ToolCall, ToolDefinition};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, JsonSchema)]
struct Verdict {
    winner: String,
}

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: "web_search".to_string(),
        description: "Search the web".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        }),
    }
}

// ============= OpenAI =============

#[cfg(feature = "openai")]
mod openai {
    use super::*;

    fn client(server: &MockServer) -> Box<dyn LLMClient> {
        Provider::OpenAI {
            api_key: "sk-test".to_string(),
            api_base: format!("{}/v1", server.uri()),
            model: "gpt-4o-mini".to_string(),
            params: ModelParams {
                temperature: Some(0.0),
                max_tokens: None,
            },
        }
        .create_client()
        .unwrap()
    }

    fn completion(message: serde_json::Value, finish_reason: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1735689600,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": finish_reason
            }]
        })
    }

    #[tokio::test]
    async fn test_text_generation_with_completion_ceiling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_completion_tokens": 512,
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({"role": "assistant", "content": "Hi."}),
                "stop",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .generate_with_history(&[Message::system("Be brief."), Message::human("Hello")], Some(512))
            .await
            .unwrap();
        assert_eq!(text, "Hi.");
    }

    #[tokio::test]
    async fn test_tool_calls_are_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": "auto",
                "tools": [{"type": "function", "function": {"name": "web_search"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {
                            "id": "call_a",
                            "type": "function",
                            "function": {"name": "web_search", "arguments": "{\"query\":\"solar\"}"}
                        },
                        {
                            "id": "call_b",
                            "type": "function",
                            "function": {"name": "web_search", "arguments": "{\"query\":\"wind\"}"}
                        }
                    ]
                }),
                "tool_calls",
            )))
            .mount(&server)
            .await;

        let response = client(&server)
            .generate_with_tools_and_history(&[Message::human("compare")], &[search_tool()])
            .await
            .unwrap();

        assert_eq!(response.finish_reason, "tool_calls");
        assert_eq!(response.content, "");
        assert_eq!(
            response.tool_calls,
            vec![
                ToolCall::new("call_a", "web_search", json!({"query": "solar"})),
                ToolCall::new("call_b", "web_search", json!({"query": "wind"})),
            ]
        );
    }

    #[tokio::test]
    async fn test_tool_history_round_trip_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "compare"},
                    {
                        "role": "assistant",
                        "tool_calls": [{"id": "call_a", "function": {"arguments": "{\"query\":\"solar\"}"}}]
                    },
                    {"role": "tool", "tool_call_id": "call_a", "content": "results"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({"role": "assistant", "content": "Done."}),
                "stop",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![
            Message::human("compare"),
            Message::ai(
                "",
                vec![ToolCall::new("call_a", "web_search", json!({"query": "solar"}))],
            ),
            Message::tool("call_a", "web_search", "results"),
        ];
        let response = client(&server)
            .generate_with_tools_and_history(&history, &[search_tool()])
            .await
            .unwrap();
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.content, "Done.");
    }

    #[tokio::test]
    async fn test_structured_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "response_format": {"type": "json_schema", "json_schema": {"name": "Verdict"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({"role": "assistant", "content": "{\"winner\":\"wind\"}"}),
                "stop",
            )))
            .mount(&server)
            .await;

        let client = client(&server);
        let verdict: Verdict = generate_typed(client.as_ref(), &[Message::human("which?")])
            .await
            .unwrap();
        assert_eq!(verdict.winner, "wind");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "message": "The model `gpt-4o-mini` does not exist",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "model_not_found"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("hello")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OpenAI API error"));
        assert!(msg.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_invalid_structured_json_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                json!({"role": "assistant", "content": "not json"}),
                "stop",
            )))
            .mount(&server)
            .await;

        let client = client(&server);
        let result = generate_typed::<Verdict>(client.as_ref(), &[Message::human("which?")]).await;
        assert!(result.is_err());
    }
}

// ============= Ollama =============

#[cfg(feature = "ollama")]
mod ollama {
    use super::*;

    fn client(server: &MockServer) -> Box<dyn LLMClient> {
        Provider::Ollama {
            base_url: server.uri(),
            model: "qwen2.5".to_string(),
            params: ModelParams::default(),
        }
        .create_client()
        .unwrap()
    }

    fn chat(message: serde_json::Value) -> serde_json::Value {
        json!({
            "model": "qwen2.5",
            "created_at": "2025-01-01T00:00:00Z",
            "message": message,
            "done": true,
            "done_reason": "stop"
        })
    }

    #[tokio::test]
    async fn test_text_generation_sets_num_predict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "qwen2.5",
                "stream": false,
                "options": {"num_predict": 2048}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat(json!({"role": "assistant", "content": "compressed"}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .generate_with_history(&[Message::human("compress this")], Some(2048))
            .await
            .unwrap();
        assert_eq!(text, "compressed");
    }

    #[tokio::test]
    async fn test_tool_calls_get_unique_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "tools": [{"type": "function", "function": {"name": "web_search"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat(json!({
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "web_search", "arguments": {"query": "solar"}}},
                    {"function": {"name": "web_search", "arguments": {"query": "wind"}}}
                ]
            }))))
            .mount(&server)
            .await;

        let response = client(&server)
            .generate_with_tools_and_history(&[Message::human("compare")], &[search_tool()])
            .await
            .unwrap();

        assert_eq!(response.finish_reason, "tool_calls");
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].arguments, json!({"query": "solar"}));
        assert_eq!(response.tool_calls[1].arguments, json!({"query": "wind"}));
        assert_ne!(response.tool_calls[0].id, response.tool_calls[1].id);
        assert!(response.tool_calls[0].id.starts_with("call_"));
    }

    #[tokio::test]
    async fn test_structured_output_sends_schema_as_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "format": {"type": "object", "required": ["winner"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat(json!({
                "role": "assistant",
                "content": "{\"winner\": \"solar\"}"
            }))))
            .mount(&server)
            .await;

        let client = client(&server);
        let verdict: Verdict = generate_typed(client.as_ref(), &[Message::human("which?")])
            .await
            .unwrap();
        assert_eq!(verdict.winner, "solar");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'qwen2.5' not found"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_with_history(&[Message::human("hi")], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
