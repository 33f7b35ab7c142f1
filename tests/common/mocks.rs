//! Mock implementations for testing.
//!
//! Scripted LLM clients, a canned search backend and a fake research worker,
//! shared across the integration test files.

#![allow(dead_code)]

use ares_research::llm::client::OutputSchema;
use ares_research::llm::{LLMClient, LLMResponse};
use ares_research::research::{ResearchOutcome, ResearchWorker};
use ares_research::search::{SearchClient, SearchOptions, SearchResult};
use ares_research::types::{AppError, Message, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered record of what happened during a test
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> usize {
        self.events()
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("event '{}' not recorded", event))
    }
}

/// One canned model reply
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer to a tool-calling request
    Turn(LLMResponse),
    /// Answer to a free-text request
    Text(String),
    /// Answer to a fixed-schema request
    Structured(Value),
    /// Fail the call
    Fail(String),
}

impl Reply {
    /// A turn with no tool calls
    pub fn final_turn(content: &str) -> Self {
        Reply::Turn(LLMResponse {
            content: content.to_string(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        })
    }

    /// A turn requesting the given tool calls
    pub fn tools(calls: Vec<ToolCall>) -> Self {
        Reply::Turn(LLMResponse {
            content: String::new(),
            tool_calls: calls,
            finish_reason: "tool_calls".to_string(),
        })
    }
}

/// What a scripted client was asked
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<String>,
    pub max_tokens: Option<u32>,
}

/// LLM client that replays a fixed script, one reply per call.
///
/// Running past the end of the script, or getting a call of the wrong kind,
/// is reported as an LLM error.
pub struct ScriptedLLMClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    log: Option<(EventLog, String)>,
}

impl ScriptedLLMClient {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            log: None,
        }
    }

    /// Record `label` in `log` every time the client is called
    pub fn with_log(mut self, log: EventLog, label: &str) -> Self {
        self.log = Some((log, label.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn next(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        max_tokens: Option<u32>,
    ) -> Result<Reply> {
        if let Some((log, label)) = &self.log {
            log.push(label.clone());
        }
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            max_tokens,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::LLM("script exhausted".to_string()))
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate_with_history(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String> {
        match self.next(messages, &[], max_tokens)? {
            Reply::Text(text) => Ok(text),
            Reply::Fail(msg) => Err(AppError::LLM(msg)),
            other => Err(AppError::LLM(format!("expected text reply, got {:?}", other))),
        }
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        match self.next(messages, tools, None)? {
            Reply::Turn(response) => Ok(response),
            Reply::Fail(msg) => Err(AppError::LLM(msg)),
            other => Err(AppError::LLM(format!("expected turn reply, got {:?}", other))),
        }
    }

    async fn generate_structured(
        &self,
        messages: &[Message],
        _schema: &OutputSchema,
    ) -> Result<Value> {
        match self.next(messages, &[], None)? {
            Reply::Structured(value) => Ok(value),
            Reply::Fail(msg) => Err(AppError::LLM(msg)),
            other => Err(AppError::LLM(format!(
                "expected structured reply, got {:?}",
                other
            ))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Supervisor model that delegates forever and never finishes on its own
#[derive(Default)]
pub struct AlwaysDelegatingClient {
    calls: AtomicUsize,
}

impl AlwaysDelegatingClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for AlwaysDelegatingClient {
    async fn generate_with_history(&self, _: &[Message], _: Option<u32>) -> Result<String> {
        Ok("more research needed".to_string())
    }

    async fn generate_with_tools_and_history(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LLMResponse {
            content: String::new(),
            tool_calls: vec![
                conduct(&format!("d{}-a", n), &format!("topic {}a", n)),
                conduct(&format!("d{}-b", n), &format!("topic {}b", n)),
            ],
            finish_reason: "tool_calls".to_string(),
        })
    }

    async fn generate_structured(&self, _: &[Message], _: &OutputSchema) -> Result<Value> {
        Err(AppError::LLM("not scripted".to_string()))
    }

    fn model_name(&self) -> &str {
        "always-delegating"
    }
}

/// Behavior of the fake worker for one topic
#[derive(Debug, Clone)]
pub enum WorkerBehavior {
    Succeed {
        delay: Duration,
        compressed: String,
        raw: Vec<String>,
    },
    Fail,
    Panic,
}

/// Research worker with per-topic canned behavior.
///
/// Unknown topics succeed immediately with "findings for <topic>".
#[derive(Default)]
pub struct FakeWorker {
    behaviors: HashMap<String, WorkerBehavior>,
    log: EventLog,
    calls: AtomicUsize,
}

impl FakeWorker {
    pub fn new(log: EventLog) -> Self {
        Self {
            behaviors: HashMap::new(),
            log,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn on(mut self, topic: &str, behavior: WorkerBehavior) -> Self {
        self.behaviors.insert(topic.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResearchWorker for FakeWorker {
    async fn research(&self, topic: &str) -> Result<ResearchOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("start {}", topic));

        let behavior = self
            .behaviors
            .get(topic)
            .cloned()
            .unwrap_or_else(|| WorkerBehavior::Succeed {
                delay: Duration::ZERO,
                compressed: format!("findings for {}", topic),
                raw: vec![format!("raw for {}", topic)],
            });

        match behavior {
            WorkerBehavior::Succeed {
                delay,
                compressed,
                raw,
            } => {
                tokio::time::sleep(delay).await;
                self.log.push(format!("done {}", topic));
                Ok(ResearchOutcome {
                    compressed_research: compressed,
                    raw_notes: raw,
                })
            }
            WorkerBehavior::Fail => {
                self.log.push(format!("failed {}", topic));
                Err(AppError::LLM("compression failed".to_string()))
            }
            WorkerBehavior::Panic => panic!("worker for '{}' blew up", topic),
        }
    }
}

/// Search backend with canned results per query
#[derive(Default)]
pub struct MockSearchClient {
    results: HashMap<String, Vec<SearchResult>>,
    queries: Mutex<Vec<String>>,
    fail: bool,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_results(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(&self, query: &str, _options: &SearchOptions) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(AppError::Search("search backend down".to_string()));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn hit(url: &str, title: &str, content: &str, raw: Option<&str>) -> SearchResult {
    SearchResult {
        url: url.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        raw_content: raw.map(String::from),
    }
}

pub fn conduct(id: &str, topic: &str) -> ToolCall {
    ToolCall::new(id, "conduct_research", json!({ "research_topic": topic }))
}

pub fn think(id: &str, reflection: &str) -> ToolCall {
    ToolCall::new(id, "think_tool", json!({ "reflection": reflection }))
}

pub fn complete(id: &str) -> ToolCall {
    ToolCall::new(id, "research_complete", json!({}))
}

pub fn search(id: &str, query: &str) -> ToolCall {
    ToolCall::new(id, "web_search", json!({ "query": query }))
}

/// (id, name, content) of every tool-result message, in order
pub fn tool_results(messages: &[Message]) -> Vec<(String, String, String)> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Tool {
                tool_call_id,
                name,
                content,
            } => Some((tool_call_id.clone(), name.clone(), content.clone())),
            _ => None,
        })
        .collect()
}
